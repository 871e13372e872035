// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ASN.1 data structures defined by RFC 5035.

use {
    crate::asn1::{rfc3280::GeneralName, rfc5280::AlgorithmIdentifier},
    bcder::{
        decode::{Constructed, DecodeError, Source},
        encode,
        encode::{PrimitiveContent, Values},
        ConstOid, Integer, Mode, OctetString, Oid,
    },
    bytes::Bytes,
    std::io::Write,
};

/// Identifies the signing-certificate-v2 attribute.
///
/// 1.2.840.113549.1.9.16.2.47
pub const OID_SIGNING_CERTIFICATE_V2: ConstOid =
    Oid(&[42, 134, 72, 134, 247, 13, 1, 9, 16, 2, 47]);

/// SHA-256 digest algorithm.
///
/// This is the default hash algorithm for [EssCertIdV2] and is omitted
/// from the encoding when in effect.
///
/// 2.16.840.1.101.3.4.2.1
const OID_SHA256: ConstOid = Oid(&[96, 134, 72, 1, 101, 3, 4, 2, 1]);

/// Binds the signature to specific certificates.
///
/// Certificate policies are tolerated on decode but not interpreted.
///
/// ```ASN.1
/// SigningCertificateV2 ::= SEQUENCE {
///   certs SEQUENCE OF ESSCertIDv2,
///   policies SEQUENCE OF PolicyInformation OPTIONAL }
/// ```
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SigningCertificateV2 {
    pub certs: Vec<EssCertIdV2>,
}

impl SigningCertificateV2 {
    /// Attempt to decode DER encoded bytes to a parsed data structure.
    pub fn decode_der(data: &[u8]) -> Result<Self, DecodeError<std::convert::Infallible>> {
        Constructed::decode(data, Mode::Der, |cons| Self::take_from(cons))
    }

    pub fn take_from<S: Source>(cons: &mut Constructed<S>) -> Result<Self, DecodeError<S::Error>> {
        cons.take_sequence(|cons| {
            let certs = cons.take_sequence(|cons| {
                let mut certs = Vec::new();

                while let Some(cert) = EssCertIdV2::take_opt_from(cons)? {
                    certs.push(cert);
                }

                Ok(certs)
            })?;

            let _policies = cons.capture_all()?;

            Ok(Self { certs })
        })
    }

    pub fn encode_ref(&self) -> impl Values + '_ {
        encode::sequence(encode::sequence(&self.certs))
    }
}

/// Identifies a single certificate by the digest of its DER encoding.
///
/// ```ASN.1
/// ESSCertIDv2 ::= SEQUENCE {
///   hashAlgorithm AlgorithmIdentifier DEFAULT {algorithm id-sha256},
///   certHash Hash,
///   issuerSerial IssuerSerial OPTIONAL }
/// ```
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EssCertIdV2 {
    /// `None` means the SHA-256 default is in effect.
    pub hash_algorithm: Option<AlgorithmIdentifier>,
    pub cert_hash: OctetString,
    pub issuer_serial: Option<IssuerSerial>,
}

impl EssCertIdV2 {
    /// The digest algorithm OID in effect, accounting for the default.
    pub fn hash_algorithm_oid(&self) -> Oid {
        match &self.hash_algorithm {
            Some(alg) => alg.algorithm.clone(),
            None => Oid(Bytes::copy_from_slice(OID_SHA256.as_ref())),
        }
    }

    pub fn take_opt_from<S: Source>(
        cons: &mut Constructed<S>,
    ) -> Result<Option<Self>, DecodeError<S::Error>> {
        cons.take_opt_sequence(|cons| {
            let hash_algorithm = AlgorithmIdentifier::take_opt_from(cons)?;
            let cert_hash = OctetString::take_from(cons)?;
            let issuer_serial = IssuerSerial::take_opt_from(cons)?;

            Ok(Self {
                hash_algorithm,
                cert_hash,
                issuer_serial,
            })
        })
    }

    pub fn encode_ref(&self) -> impl Values + '_ {
        encode::sequence((
            self.hash_algorithm.as_ref(),
            self.cert_hash.encode_ref(),
            self.issuer_serial.as_ref().map(|is| is.encode_ref()),
        ))
    }
}

impl Values for EssCertIdV2 {
    fn encoded_len(&self, mode: Mode) -> usize {
        self.encode_ref().encoded_len(mode)
    }

    fn write_encoded<W: Write>(&self, mode: Mode, target: &mut W) -> Result<(), std::io::Error> {
        self.encode_ref().write_encoded(mode, target)
    }
}

/// Issuer name and serial number of the bound certificate.
///
/// ```ASN.1
/// IssuerSerial ::= SEQUENCE {
///   issuer GeneralNames,
///   serialNumber CertificateSerialNumber }
/// ```
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct IssuerSerial {
    pub issuer: Vec<GeneralName>,
    pub serial_number: Integer,
}

impl IssuerSerial {
    pub fn take_opt_from<S: Source>(
        cons: &mut Constructed<S>,
    ) -> Result<Option<Self>, DecodeError<S::Error>> {
        cons.take_opt_sequence(|cons| {
            let issuer = cons.take_sequence(|cons| {
                let mut names = Vec::new();

                while let Some(name) = GeneralName::take_opt_from(cons)? {
                    names.push(name);
                }

                Ok(names)
            })?;
            let serial_number = Integer::take_from(cons)?;

            Ok(Self {
                issuer,
                serial_number,
            })
        })
    }

    pub fn encode_ref(&self) -> impl Values + '_ {
        encode::sequence((
            encode::sequence(&self.issuer),
            (&self.serial_number).encode(),
        ))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn round_trip_with_default_hash_algorithm() {
        let original = SigningCertificateV2 {
            certs: vec![EssCertIdV2 {
                hash_algorithm: None,
                cert_hash: OctetString::new(vec![0x42; 32].into()),
                issuer_serial: None,
            }],
        };

        assert_eq!(original.certs[0].hash_algorithm_oid(), OID_SHA256);

        let der = bcder::Captured::from_values(Mode::Der, original.encode_ref());

        let decoded = SigningCertificateV2::decode_der(der.as_slice()).unwrap();
        assert_eq!(decoded, original);
    }
}
