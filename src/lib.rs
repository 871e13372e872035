// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

/*! CMS (RFC 5652) SignedData with CAdES-BES signed attributes.

This crate implements creation and verification of
[RFC 5652](https://tools.ietf.org/rfc/rfc5652.txt) *SignedData* payloads
in pure, safe Rust, carrying the CAdES-BES signed attribute profile:
content-type, signing-time, message-digest, and the
signing-certificate-v2 attribute of
[RFC 5035](https://tools.ietf.org/rfc/rfc5035.txt).

Functionality includes:

* (De)serialization for the subset of ASN.1 data structures involved
  in signed data. See the [asn1] module tree.
* [SignedDataBuilder] / [SignerBuilder] for producing DER-encoded
  payloads: attached or detached content, externally computed digests,
  multiple signers, plain signatures without signed attributes.
* [Verifier] for checking payloads: every signer is tried against every
  available certificate and the outcome is reported per pair.

# IMPORTANT SECURITY LIMITATIONS

**The verification functionality in this crate is purposefully limited
and isn't sufficient for trusting signed data. You need to include
additional trust verification if you are using this crate for verifying
signed data.**

Verification answers the question *did certificate X sign content Y*. It
does not answer whether you should trust certificate X: certificate chain
validation, expiration, and revocation checking are all out of scope and
need to happen elsewhere.

# Technical Notes

RFC 5652 allows BER (not just DER) for serialization. This crate both
produces and consumes DER: parsed values remember the mode they were read
in and are re-serialized during verification, so indefinite-length and
other BER-only encodings are rejected on input. The ASN.1 data structures
referenced by the RFCs are defined recursively in this crate and taught to
serialize using `bcder`.
*/

pub mod asn1;
mod algorithm;
mod certificate;
mod signing;
#[cfg(test)]
mod testutil;
mod verify;

pub use {
    algorithm::{
        digest, DigestAlgorithm, EcdsaCurve, KeyAlgorithm, Signature, SignatureAlgorithm,
        SigningKey,
    },
    bcder::Oid,
    bytes::Bytes,
    certificate::{certificate_is_subset_of, Certificate, CertificatePublicKey},
    signing::{SignedDataBuilder, SignerBuilder},
    verify::{SignerVerification, VerificationOutcome, VerificationReport, Verifier},
};

use thiserror::Error;

/// Error type for this crate.
#[derive(Debug, Error)]
pub enum CmsError {
    /// An error occurred decoding ASN.1 data.
    #[error("ASN.1 decode error: {0}")]
    Decode(#[from] bcder::decode::DecodeError<std::convert::Infallible>),

    /// A general I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error decoding PEM data.
    #[error("PEM error: {0}")]
    Pem(#[from] pem::PemError),

    /// Error occurred when creating a signature.
    #[error("error during signature creation: {0}")]
    SignatureCreation(#[from] signature::Error),

    /// The signing key could not be loaded from its PKCS#8 encoding.
    #[error("signing key rejected: {0}")]
    SigningKeyRejected(String),

    /// No content to operate on.
    ///
    /// Raised when signing without content or verifying a detached payload
    /// without being given the detached content.
    #[error("no content available")]
    MissingContent,

    /// An externally computed digest was supplied for an attached payload.
    #[error("externally computed digests require detached mode")]
    InvalidContentCombination,

    /// A signer digested the content with an algorithm other than the one
    /// the verifier is using.
    #[error("signer digest algorithm differs from verification digest algorithm")]
    DigestAlgorithmMismatch,

    /// An unknown or undeclared message digest algorithm was encountered.
    #[error("unknown digest algorithm: {0}")]
    UnknownDigestAlgorithm(String),

    /// An unknown signature algorithm was encountered.
    #[error("unknown signature algorithm: {0}")]
    UnknownSignatureAlgorithm(String),

    /// An unknown signing key algorithm was encountered.
    #[error("unknown key algorithm: {0}")]
    UnknownKeyAlgorithm(String),

    /// An unknown elliptic curve was encountered.
    #[error("unknown elliptic curve: {0}")]
    UnknownEllipticCurve(String),

    /// An algorithm name was not recognized.
    #[error("unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// A signature cannot be verified with the given key type.
    #[error("signatures of kind {1:?} cannot be verified with a {0:?} key")]
    UnsupportedSignatureVerification(KeyAlgorithm, SignatureAlgorithm),

    /// The content-type attribute is missing from the SignedAttributes structure.
    #[error("content-type attribute missing from SignedAttributes")]
    MissingSignedAttributeContentType,

    /// The content-type attribute in the SignedAttributes structure is malformed.
    #[error("content-type attribute in SignedAttributes is malformed")]
    MalformedSignedAttributeContentType,

    /// The content-type attribute does not name the encapsulated content type.
    #[error("content-type attribute does not match encapsulated content type")]
    SignedAttributeContentTypeMismatch,

    /// The message-digest attribute is missing from the SignedAttributes structure.
    #[error("message-digest attribute missing from SignedAttributes")]
    MissingSignedAttributeMessageDigest,

    /// The message-digest attribute is malformed.
    #[error("message-digest attribute in SignedAttributes is malformed")]
    MalformedSignedAttributeMessageDigest,

    /// The message-digest attribute does not match the digest of the content.
    #[error("message digest does not match digest of content")]
    MessageDigestMismatch,

    /// The signing-time signed attribute is malformed.
    #[error("signing-time attribute in SignedAttributes is malformed")]
    MalformedSignedAttributeSigningTime,

    /// The signing-certificate-v2 signed attribute is malformed.
    #[error("signing-certificate-v2 attribute in SignedAttributes is malformed")]
    MalformedSigningCertificateV2,
}

impl From<ring::error::KeyRejected> for CmsError {
    fn from(e: ring::error::KeyRejected) -> Self {
        Self::SigningKeyRejected(e.to_string())
    }
}

/// High-level read view of a parsed SignedData payload.
///
/// This exists to facilitate common interactions with a parsed payload
/// without exposing the complexity of ASN.1. Use [Verifier] to check
/// signatures; use the [asn1] module tree for full structural access.
#[derive(Clone, Debug)]
pub struct SignedData {
    /// Content digest algorithms declared by the payload.
    digest_algorithms: Vec<DigestAlgorithm>,

    /// Content that was signed, when carried inline.
    signed_content: Option<Vec<u8>>,

    /// Certificates embedded within the payload.
    certificates: Vec<Certificate>,

    /// The parsed ASN.1 backing this instance.
    raw: asn1::rfc5652::SignedData,
}

impl SignedData {
    /// Construct an instance by parsing DER data.
    pub fn parse_der(data: &[u8]) -> Result<Self, CmsError> {
        let raw = asn1::rfc5652::SignedData::decode_der(data)?;

        let digest_algorithms = raw
            .digest_algorithms
            .iter()
            .map(DigestAlgorithm::try_from)
            .collect::<Result<Vec<_>, CmsError>>()?;

        let signed_content = raw
            .content_info
            .content
            .as_ref()
            .map(|content| content.to_bytes().to_vec());

        let certificates = match &raw.certificates {
            Some(certs) => certs
                .iter()
                .map(Certificate::try_from)
                .collect::<Result<Vec<_>, CmsError>>()?,
            None => Vec::new(),
        };

        Ok(Self {
            digest_algorithms,
            signed_content,
            certificates,
            raw,
        })
    }

    /// Content digest algorithms declared by the payload.
    pub fn digest_algorithms(&self) -> &[DigestAlgorithm] {
        &self.digest_algorithms
    }

    /// Obtain the signed content, when carried inline.
    pub fn signed_content(&self) -> Option<&[u8]> {
        self.signed_content.as_deref()
    }

    /// Obtain certificates embedded in the payload.
    pub fn certificates(&self) -> impl Iterator<Item = &Certificate> {
        self.certificates.iter()
    }

    /// The number of signers of this payload.
    pub fn signer_count(&self) -> usize {
        self.raw.signer_infos.len()
    }

    /// Obtain the parsed ASN.1 data structure backing this instance.
    pub fn raw_signed_data(&self) -> &asn1::rfc5652::SignedData {
        &self.raw
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::testutil::{rsa_cert, rsa_private_key},
        bcder::{encode::Values, Mode},
    };

    fn build_payload() -> Vec<u8> {
        let key = rsa_private_key();
        let cert = rsa_cert();

        SignedDataBuilder::default()
            .signed_content(b"hello world".to_vec())
            .certificate(cert.clone())
            .signer(SignerBuilder::new(&key, cert))
            .build_der()
            .unwrap()
    }

    #[test]
    fn parse_der_high_level_view() {
        let der = build_payload();

        let signed_data = SignedData::parse_der(&der).unwrap();

        assert_eq!(signed_data.digest_algorithms(), &[DigestAlgorithm::Sha256]);
        assert_eq!(signed_data.signed_content(), Some(&b"hello world"[..]));
        assert_eq!(signed_data.certificates().count(), 1);
        assert_eq!(signed_data.signer_count(), 1);

        let cert = signed_data.certificates().next().unwrap();
        assert_eq!(cert.serial_number(), rsa_cert().serial_number());
    }

    #[test]
    fn reencode_is_stable() {
        let der = build_payload();

        let parsed = asn1::rfc5652::SignedData::decode_der(&der).unwrap();

        let mut reencoded = Vec::new();
        parsed
            .encode_ref()
            .write_encoded(Mode::Der, &mut reencoded)
            .unwrap();

        assert_eq!(reencoded, der);
    }
}
