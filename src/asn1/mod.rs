// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

/*! ASN.1 data structures for CMS messages.

Types in this module tree are low-level and only express (de)serialization
of the wire structures. Higher-level functionality lives outside `asn1`.
*/

pub mod common;
pub mod rfc3280;
pub mod rfc5035;
pub mod rfc5280;
pub mod rfc5652;
pub mod rfc5958;
