// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

/*! Verification of SignedData payloads.

The [Verifier] checks every signer against every available certificate
rather than trusting the signer identifier to name the right one. This
mirrors how relying parties deal with payloads produced by tooling that
populates the identifier inconsistently.
*/

use {
    crate::{
        asn1::{
            common::Time,
            rfc5035::{SigningCertificateV2, OID_SIGNING_CERTIFICATE_V2},
            rfc5652::{
                AttributeOrder, SignedData, SignerIdentifier, SignerInfo, OID_CONTENT_TYPE,
                OID_MESSAGE_DIGEST, OID_SIGNING_TIME,
            },
        },
        certificate::{certificate_is_subset_of, Certificate},
        CmsError, DigestAlgorithm, SignatureAlgorithm,
    },
    bcder::{decode::Constructed, Mode, OctetString, Oid},
};

/// Aggregate outcome of verifying a payload.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum VerificationOutcome {
    /// Every signer validated against at least one certificate.
    Valid,

    /// Some signers validated, others did not.
    PartiallyValid,

    /// No signer validated against any certificate.
    Invalid,

    /// No certificates were available to verify against.
    NoCertificates,
}

/// Result of checking one signer against one candidate certificate.
#[derive(Clone, Debug)]
pub struct SignerVerification {
    /// Index of the signer within the payload's SignerInfos.
    pub signer_index: usize,

    /// Index of the certificate within the pool used for verification.
    pub certificate_index: usize,

    /// Whether the signature validated with this certificate's public key.
    pub verified: bool,

    /// Whether the certificate matches the signer's signer identifier.
    ///
    /// Purely informational. Verification does not require the match, since
    /// producers populate the identifier inconsistently.
    pub sid_match: bool,

    /// Human readable subject of the candidate certificate.
    pub certificate_subject: String,
}

/// Outcome of verifying a payload, with per-pair detail.
///
/// Instances are immutable snapshots produced by [Verifier::verify].
#[derive(Clone, Debug)]
pub struct VerificationReport {
    outcome: VerificationOutcome,
    results: Vec<SignerVerification>,
}

impl VerificationReport {
    pub fn outcome(&self) -> VerificationOutcome {
        self.outcome
    }

    /// Per (signer, certificate) pair results, in signer-major order.
    pub fn results(&self) -> &[SignerVerification] {
        &self.results
    }

    /// Whether every signer validated.
    pub fn is_valid(&self) -> bool {
        self.outcome == VerificationOutcome::Valid
    }
}

/// Verifies SignedData payloads.
pub struct Verifier {
    /// Digest algorithm used to digest the payload content.
    ///
    /// Must match the digest algorithm declared by every signer.
    digest_algorithm: DigestAlgorithm,
}

impl Default for Verifier {
    fn default() -> Self {
        Self::new(DigestAlgorithm::Sha256)
    }
}

impl Verifier {
    pub fn new(digest_algorithm: DigestAlgorithm) -> Self {
        Self { digest_algorithm }
    }

    /// Verify a DER-encoded SignedData payload.
    ///
    /// `candidate_certs` supplies certificates to verify against when the
    /// payload embeds none. `detached_content` supplies the content for
    /// detached signatures; content embedded in the payload takes
    /// precedence.
    ///
    /// Structural problems (malformed or missing mandatory attributes, a
    /// message digest that doesn't match the content) surface as errors.
    /// Signature mismatches and certificate binding mismatches do not;
    /// they show up as unverified pairs in the report.
    pub fn verify(
        &self,
        message: &[u8],
        candidate_certs: Option<&[Certificate]>,
        detached_content: Option<&[u8]>,
    ) -> Result<VerificationReport, CmsError> {
        let signed_data = SignedData::decode_der(message)?;

        let payload = if let Some(content) = &signed_data.content_info.content {
            content.to_bytes().to_vec()
        } else if let Some(content) = detached_content {
            content.to_vec()
        } else {
            return Err(CmsError::MissingContent);
        };

        // The digest algorithm we're about to use must be one the payload
        // declares, otherwise signers can't have used it.
        let digest_oid = Oid::from(self.digest_algorithm);
        if !signed_data
            .digest_algorithms
            .iter()
            .any(|alg| alg.algorithm == digest_oid)
        {
            return Err(CmsError::UnknownDigestAlgorithm(format!(
                "digest algorithm {} not declared by payload",
                digest_oid
            )));
        }

        let certificates = if let Some(certs) = &signed_data.certificates {
            certs
                .iter()
                .map(Certificate::try_from)
                .collect::<Result<Vec<_>, CmsError>>()?
        } else if let Some(certs) = candidate_certs {
            certs.to_vec()
        } else {
            Vec::new()
        };

        if certificates.is_empty() {
            log::warn!("no certificates available to verify against");

            return Ok(VerificationReport {
                outcome: VerificationOutcome::NoCertificates,
                results: Vec::new(),
            });
        }

        let payload_digest = self.digest_algorithm.digest_data(&payload);

        let mut results = Vec::new();

        for (signer_index, signer) in signed_data.signer_infos.iter().enumerate() {
            let signer_digest = DigestAlgorithm::try_from(&signer.digest_algorithm)?;

            if signer_digest != self.digest_algorithm {
                return Err(CmsError::DigestAlgorithmMismatch);
            }

            let signature_algorithm = SignatureAlgorithm::from_oid_and_digest_algorithm(
                &signer.signature_algorithm.algorithm,
                signer_digest,
            )?;

            for (certificate_index, cert) in certificates.iter().enumerate() {
                let verified = self.verify_signer_with_certificate(
                    signer,
                    cert,
                    signature_algorithm,
                    &signed_data.content_info.content_type,
                    &payload,
                    &payload_digest,
                )?;

                log::debug!(
                    "signer {} against certificate {}: {}",
                    signer_index,
                    certificate_index,
                    if verified { "verified" } else { "not verified" }
                );

                results.push(SignerVerification {
                    signer_index,
                    certificate_index,
                    verified,
                    sid_match: signer_identifier_matches(&signer.sid, cert),
                    certificate_subject: cert
                        .subject()
                        .user_friendly_str()
                        .unwrap_or_else(|_| String::new()),
                });
            }
        }

        let signer_count = signed_data.signer_infos.len();
        let verified_signers = (0..signer_count)
            .filter(|i| {
                results
                    .iter()
                    .any(|r| r.signer_index == *i && r.verified)
            })
            .count();

        let outcome = if verified_signers == 0 {
            VerificationOutcome::Invalid
        } else if verified_signers == signer_count {
            VerificationOutcome::Valid
        } else {
            VerificationOutcome::PartiallyValid
        };

        Ok(VerificationReport { outcome, results })
    }

    fn verify_signer_with_certificate(
        &self,
        signer: &SignerInfo,
        cert: &Certificate,
        signature_algorithm: SignatureAlgorithm,
        content_type: &Oid,
        payload: &[u8],
        payload_digest: &[u8],
    ) -> Result<bool, CmsError> {
        let verification_algorithm =
            match signature_algorithm.resolve_verification_algorithm(cert.public_key().algorithm) {
                Ok(algorithm) => algorithm,
                // A key that cannot produce this kind of signature can never
                // validate this signer.
                Err(_) => return Ok(false),
            };

        let public_key = ring::signature::UnparsedPublicKey::new(
            verification_algorithm,
            &cert.public_key().key,
        );

        let signature = signer.signature.to_bytes();

        let attributes = match &signer.signed_attributes {
            Some(attributes) => attributes,
            None => {
                // Plain signature over the content itself.
                return Ok(public_key.verify(payload, &signature).is_ok());
            }
        };

        // signing-certificate-v2 binds the signature to specific
        // certificates and is checked before anything else: a hash mismatch
        // means this candidate certificate is not the one the signature was
        // made with, so the pair fails without failing the whole operation
        // and without requiring the rest of the attributes to be sound.
        //
        // Only the certificate hash participates in the comparison. The
        // issuerSerial field, when present, is redundant with the hash and
        // is not separately matched against the candidate.
        if let Some(attribute) = attributes
            .iter()
            .find(|attr| attr.typ == OID_SIGNING_CERTIFICATE_V2)
        {
            if attribute.values.len() != 1 {
                return Err(CmsError::MalformedSigningCertificateV2);
            }

            let signing_certificate =
                SigningCertificateV2::decode_der(attribute.values[0].as_slice())
                    .map_err(|_| CmsError::MalformedSigningCertificateV2)?;

            for ess_cert in &signing_certificate.certs {
                let hash_algorithm = match DigestAlgorithm::try_from(&ess_cert.hash_algorithm_oid())
                {
                    Ok(algorithm) => algorithm,
                    Err(_) => {
                        log::info!("signing-certificate-v2 uses an unsupported hash algorithm");
                        return Ok(false);
                    }
                };

                if ess_cert.cert_hash.to_bytes().as_ref()
                    != cert.fingerprint(hash_algorithm).as_slice()
                {
                    log::info!(
                        "certificate hash does not match signing-certificate-v2 attribute"
                    );
                    return Ok(false);
                }
            }
        }

        // content-type is mandatory when signed attributes are present and
        // must name the encapsulated content type.
        let attribute = attributes
            .iter()
            .find(|attr| attr.typ == OID_CONTENT_TYPE)
            .ok_or(CmsError::MissingSignedAttributeContentType)?;

        if attribute.values.len() != 1 {
            return Err(CmsError::MalformedSignedAttributeContentType);
        }

        let stored_content_type =
            Constructed::decode(attribute.values[0].as_slice(), Mode::Der, |cons| {
                Oid::take_from(cons)
            })
            .map_err(|_| CmsError::MalformedSignedAttributeContentType)?;

        if &stored_content_type != content_type {
            return Err(CmsError::SignedAttributeContentTypeMismatch);
        }

        // message-digest is mandatory and must match the digest of the
        // content being verified.
        let attribute = attributes
            .iter()
            .find(|attr| attr.typ == OID_MESSAGE_DIGEST)
            .ok_or(CmsError::MissingSignedAttributeMessageDigest)?;

        if attribute.values.len() != 1 {
            return Err(CmsError::MalformedSignedAttributeMessageDigest);
        }

        let stored_digest =
            Constructed::decode(attribute.values[0].as_slice(), Mode::Der, |cons| {
                OctetString::take_from(cons)
            })
            .map_err(|_| CmsError::MalformedSignedAttributeMessageDigest)?;

        if hex::encode(stored_digest.to_bytes()) != hex::encode(payload_digest) {
            return Err(CmsError::MessageDigestMismatch);
        }

        // signing-time is informational only.
        if let Some(attribute) = attributes.iter().find(|attr| attr.typ == OID_SIGNING_TIME) {
            if attribute.values.len() != 1 {
                return Err(CmsError::MalformedSignedAttributeSigningTime);
            }

            let time = Constructed::decode(attribute.values[0].as_slice(), Mode::Der, |cons| {
                Time::take_from(cons)
            })
            .map_err(|_| CmsError::MalformedSignedAttributeSigningTime)?;

            log::info!(
                "signature created at {}",
                chrono::DateTime::<chrono::Utc>::from(time)
            );
        }

        // Try the canonical DER SET OF serialization first, then fall back
        // to the attribute order declared on the wire. Conforming producers
        // emit the two identically; the fallback tolerates those that never
        // sorted their attribute set.
        for order in [AttributeOrder::Canonical, AttributeOrder::Declared] {
            if let Some(signed_content) = signer.signed_attributes_digested_content(order)? {
                if public_key.verify(&signed_content, &signature).is_ok() {
                    return Ok(true);
                }

                if order == AttributeOrder::Canonical {
                    log::info!("canonical attribute order failed; retrying with declared order");
                }
            }
        }

        Ok(false)
    }
}

/// Whether a certificate matches a signer identifier.
fn signer_identifier_matches(sid: &SignerIdentifier, cert: &Certificate) -> bool {
    match sid {
        SignerIdentifier::IssuerAndSerialNumber(sid) => certificate_is_subset_of(
            &sid.serial_number,
            &sid.issuer,
            cert.serial_number(),
            cert.issuer(),
        ),
        SignerIdentifier::SubjectKeyIdentifier(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::{
            algorithm::EcdsaCurve,
            asn1::rfc5652::{
                Attribute, CertificateChoices, CertificateSet, CmsVersion,
                DigestAlgorithmIdentifiers, EncapsulatedContentInfo, SignedAttributes,
                SignerInfos, OID_ID_DATA,
            },
            signing::{SignedDataBuilder, SignerBuilder},
            testutil::{self, rsa_cert, rsa_private_key},
            KeyAlgorithm,
        },
        bcder::encode::{PrimitiveContent, Values},
        bytes::Bytes,
    };

    const CONTENT: &[u8] = b"hello world";

    fn attached_rsa_payload() -> Vec<u8> {
        let key = rsa_private_key();
        let cert = rsa_cert();

        SignedDataBuilder::default()
            .signed_content(CONTENT.to_vec())
            .certificate(cert.clone())
            .signer(SignerBuilder::new(&key, cert))
            .build_der()
            .unwrap()
    }

    #[test]
    fn attached_round_trip() {
        let report = Verifier::default()
            .verify(&attached_rsa_payload(), None, None)
            .unwrap();

        assert_eq!(report.outcome(), VerificationOutcome::Valid);
        assert!(report.is_valid());
        assert_eq!(report.results().len(), 1);
        assert!(report.results()[0].verified);
        assert!(report.results()[0].sid_match);
        assert!(!report.results()[0].certificate_subject.is_empty());
    }

    #[test]
    fn tampered_attached_content() {
        let der = attached_rsa_payload();

        let mut signed_data = SignedData::decode_der(&der).unwrap();
        signed_data.content_info.content =
            Some(OctetString::new(Bytes::from_static(b"hello w0rld")));

        let mut tampered = Vec::new();
        signed_data
            .encode_ref()
            .write_encoded(Mode::Der, &mut tampered)
            .unwrap();

        let err = Verifier::default()
            .verify(&tampered, None, None)
            .unwrap_err();

        assert!(matches!(err, CmsError::MessageDigestMismatch));
    }

    #[test]
    fn detached_round_trip() {
        let key = rsa_private_key();
        let cert = rsa_cert();

        let der = SignedDataBuilder::default()
            .signed_content(CONTENT.to_vec())
            .detached(true)
            .signer(SignerBuilder::new(&key, cert.clone()))
            .build_der()
            .unwrap();

        let verifier = Verifier::default();

        let report = verifier
            .verify(&der, Some(&[cert.clone()]), Some(CONTENT))
            .unwrap();
        assert_eq!(report.outcome(), VerificationOutcome::Valid);

        // Wrong detached content fails the message digest check.
        let err = verifier
            .verify(&der, Some(&[cert.clone()]), Some(b"hello w0rld"))
            .unwrap_err();
        assert!(matches!(err, CmsError::MessageDigestMismatch));

        // No content at all is an error.
        let err = verifier.verify(&der, Some(&[cert]), None).unwrap_err();
        assert!(matches!(err, CmsError::MissingContent));
    }

    #[test]
    fn no_certificates_outcome() {
        let key = rsa_private_key();
        let cert = rsa_cert();

        let der = SignedDataBuilder::default()
            .signed_content(CONTENT.to_vec())
            .signer(SignerBuilder::new(&key, cert))
            .build_der()
            .unwrap();

        let report = Verifier::default().verify(&der, None, None).unwrap();

        assert_eq!(report.outcome(), VerificationOutcome::NoCertificates);
        assert!(report.results().is_empty());
    }

    #[test]
    fn external_digest_round_trip() {
        let key = rsa_private_key();
        let cert = rsa_cert();

        let digest = DigestAlgorithm::Sha256.digest_data(CONTENT);

        let der = SignedDataBuilder::default()
            .external_message_digest(digest)
            .detached(true)
            .certificate(cert.clone())
            .signer(SignerBuilder::new(&key, cert))
            .build_der()
            .unwrap();

        let report = Verifier::default()
            .verify(&der, None, Some(CONTENT))
            .unwrap();

        assert_eq!(report.outcome(), VerificationOutcome::Valid);
    }

    #[test]
    fn plain_signature_round_trip() {
        let key = rsa_private_key();
        let cert = rsa_cert();

        let der = SignedDataBuilder::default()
            .signed_content(CONTENT.to_vec())
            .certificate(cert.clone())
            .signer(SignerBuilder::new(&key, cert).plain_signature(true))
            .build_der()
            .unwrap();

        let report = Verifier::default().verify(&der, None, None).unwrap();
        assert_eq!(report.outcome(), VerificationOutcome::Valid);
    }

    #[test]
    fn signer_certificate_matrix() {
        let rsa_key = rsa_private_key();
        let rsa_signer_cert = rsa_cert();

        let (ec_cert, ec_key) = testutil::self_signed_key_pair(
            KeyAlgorithm::Ecdsa(EcdsaCurve::Secp256r1),
            "ec signer",
            1,
        );
        let (ed_cert, ed_key) =
            testutil::self_signed_key_pair(KeyAlgorithm::Ed25519, "ed signer", 2);

        // Three signers but only two of their certificates are embedded, so
        // the third signer can never validate.
        let der = SignedDataBuilder::default()
            .signed_content(CONTENT.to_vec())
            .certificate(rsa_signer_cert.clone())
            .certificate(ec_cert.clone())
            .signer(SignerBuilder::new(&rsa_key, rsa_signer_cert))
            .signer(SignerBuilder::new(&ec_key, ec_cert))
            .signer(SignerBuilder::new(&ed_key, ed_cert))
            .build_der()
            .unwrap();

        let report = Verifier::default().verify(&der, None, None).unwrap();

        assert_eq!(report.outcome(), VerificationOutcome::PartiallyValid);
        assert_eq!(report.results().len(), 6);

        for result in report.results() {
            let expected = result.signer_index == result.certificate_index
                && result.signer_index < 2;
            assert_eq!(result.verified, expected);
            assert_eq!(result.sid_match, expected);
        }
    }

    #[test]
    fn declared_attribute_order_fallback() {
        let key = rsa_private_key();
        let cert = rsa_cert();

        let digest = DigestAlgorithm::Sha256.digest_data(CONTENT);

        // Attributes deliberately not in canonical SET OF order.
        let attributes = SignedAttributes::from(vec![
            Attribute::single(
                Oid(Bytes::copy_from_slice(OID_SIGNING_TIME.as_ref())),
                Time::from(chrono::Utc::now()).encode_ref(),
            ),
            Attribute::single(
                Oid(Bytes::copy_from_slice(OID_CONTENT_TYPE.as_ref())),
                Oid(Bytes::copy_from_slice(OID_ID_DATA.as_ref())).encode_ref(),
            ),
            Attribute::single(
                Oid(Bytes::copy_from_slice(OID_MESSAGE_DIGEST.as_ref())),
                OctetString::new(Bytes::from(digest)).encode(),
            ),
        ]);
        assert_ne!(&attributes.as_canonical(), &attributes);

        let signature = key
            .sign(
                &attributes
                    .digested_content(AttributeOrder::Declared)
                    .unwrap(),
            )
            .unwrap();

        let mut signer_infos = SignerInfos::default();
        signer_infos.push(SignerInfo {
            version: CmsVersion::V1,
            sid: SignerIdentifier::IssuerAndSerialNumber((&cert).into()),
            digest_algorithm: DigestAlgorithm::Sha256.into(),
            signed_attributes: Some(attributes),
            signature_algorithm: SignatureAlgorithm::Sha256Rsa.into(),
            signature: OctetString::new(Bytes::from(signature)),
            unsigned_attributes: None,
            signed_attributes_data: None,
        });

        let mut digest_algorithms = DigestAlgorithmIdentifiers::default();
        digest_algorithms.push(DigestAlgorithm::Sha256.into());

        let mut certificates = CertificateSet::default();
        certificates.push(CertificateChoices::Certificate(Box::new(
            cert.raw_certificate().clone(),
        )));

        let signed_data = SignedData {
            version: CmsVersion::V1,
            digest_algorithms,
            content_info: EncapsulatedContentInfo {
                content_type: Oid(Bytes::copy_from_slice(OID_ID_DATA.as_ref())),
                content: Some(OctetString::new(Bytes::from_static(CONTENT))),
            },
            certificates: Some(certificates),
            signer_infos,
        };

        let mut der = Vec::new();
        signed_data
            .encode_ref()
            .write_encoded(Mode::Der, &mut der)
            .unwrap();

        let report = Verifier::default().verify(&der, None, None).unwrap();
        assert_eq!(report.outcome(), VerificationOutcome::Valid);
    }

    #[test]
    fn altered_signed_attributes_fail_both_orders() {
        let der = attached_rsa_payload();

        let mut signed_data = SignedData::decode_der(&der).unwrap();

        // Replace the signing-time value after the fact. The message digest
        // still matches the content, so this only breaks the signature, in
        // both the canonical and declared serializations.
        let attributes = signed_data.signer_infos[0]
            .signed_attributes
            .as_mut()
            .unwrap();
        let position = attributes
            .iter()
            .position(|attr| attr.typ == OID_SIGNING_TIME)
            .unwrap();
        attributes[position] = Attribute::single(
            Oid(Bytes::copy_from_slice(OID_SIGNING_TIME.as_ref())),
            Time::from(chrono::Utc::now() - chrono::Duration::days(1)).encode_ref(),
        );

        let mut tampered = Vec::new();
        signed_data
            .encode_ref()
            .write_encoded(Mode::Der, &mut tampered)
            .unwrap();

        let report = Verifier::default().verify(&tampered, None, None).unwrap();

        assert_eq!(report.outcome(), VerificationOutcome::Invalid);
        assert!(!report.results()[0].verified);
    }

    #[test]
    fn signing_certificate_v2_rejects_wrong_certificate() {
        let (cert, key) = testutil::self_signed_key_pair(
            KeyAlgorithm::Ecdsa(EcdsaCurve::Secp256r1),
            "ec signer",
            3,
        );
        let (other_cert, _) = testutil::self_signed_key_pair(
            KeyAlgorithm::Ecdsa(EcdsaCurve::Secp256r1),
            "someone else",
            4,
        );

        let der = SignedDataBuilder::default()
            .signed_content(CONTENT.to_vec())
            .detached(true)
            .signer(SignerBuilder::new(&key, cert.clone()))
            .build_der()
            .unwrap();

        // Only a certificate the signature was not made with is available.
        // Its key could verify signatures of this kind, but the
        // signing-certificate-v2 attribute rules it out.
        let report = Verifier::default()
            .verify(&der, Some(&[other_cert.clone()]), Some(CONTENT))
            .unwrap();

        assert_eq!(report.outcome(), VerificationOutcome::Invalid);
        assert!(!report.results()[0].verified);

        // With the right certificate alongside, the signer still validates.
        let report = Verifier::default()
            .verify(&der, Some(&[other_cert, cert]), Some(CONTENT))
            .unwrap();

        assert_eq!(report.outcome(), VerificationOutcome::Valid);
        assert!(!report.results()[0].verified);
        assert!(report.results()[1].verified);
    }

    #[test]
    fn certificate_binding_checked_before_content_attributes() {
        let (cert, key) = testutil::self_signed_key_pair(
            KeyAlgorithm::Ecdsa(EcdsaCurve::Secp256r1),
            "ec signer",
            5,
        );
        let (other_cert, _) = testutil::self_signed_key_pair(
            KeyAlgorithm::Ecdsa(EcdsaCurve::Secp256r1),
            "someone else",
            6,
        );

        let der = SignedDataBuilder::default()
            .signed_content(CONTENT.to_vec())
            .detached(true)
            .signer(SignerBuilder::new(&key, cert.clone()))
            .build_der()
            .unwrap();

        // The candidate certificate is ruled out by the certificate binding
        // before the message digest is consulted, so wrong detached content
        // soft-fails the pair instead of aborting the whole verification.
        let report = Verifier::default()
            .verify(&der, Some(&[other_cert]), Some(b"not the content"))
            .unwrap();

        assert_eq!(report.outcome(), VerificationOutcome::Invalid);
        assert!(!report.results()[0].verified);

        // With the bound certificate the digest check runs and fails hard.
        let err = Verifier::default()
            .verify(&der, Some(&[cert]), Some(b"not the content"))
            .unwrap_err();
        assert!(matches!(err, CmsError::MessageDigestMismatch));
    }

    #[test]
    fn digest_algorithm_not_declared() {
        let key = rsa_private_key();
        let cert = rsa_cert();

        let der = SignedDataBuilder::default()
            .signed_content(CONTENT.to_vec())
            .certificate(cert.clone())
            .signer(SignerBuilder::new(&key, cert).digest_algorithm(DigestAlgorithm::Sha384))
            .build_der()
            .unwrap();

        // The payload only declares SHA-384 but the verifier digests with
        // SHA-256.
        let err = Verifier::default().verify(&der, None, None).unwrap_err();
        assert!(matches!(err, CmsError::UnknownDigestAlgorithm(_)));
    }

    #[test]
    fn signer_digest_algorithm_mismatch() {
        let key = rsa_private_key();
        let signer_cert = rsa_cert();

        let (ec_cert, ec_key) = testutil::self_signed_key_pair(
            KeyAlgorithm::Ecdsa(EcdsaCurve::Secp256r1),
            "ec signer",
            4,
        );

        let der = SignedDataBuilder::default()
            .signed_content(CONTENT.to_vec())
            .certificate(signer_cert.clone())
            .certificate(ec_cert.clone())
            .signer(SignerBuilder::new(&key, signer_cert))
            .signer(SignerBuilder::new(&ec_key, ec_cert).digest_algorithm(DigestAlgorithm::Sha384))
            .build_der()
            .unwrap();

        // SHA-256 is declared so the engine check passes, but the second
        // signer digested with SHA-384.
        let err = Verifier::default().verify(&der, None, None).unwrap_err();
        assert!(matches!(err, CmsError::DigestAlgorithmMismatch));
    }

    #[test]
    fn sha384_verifier() {
        let key = rsa_private_key();
        let cert = rsa_cert();

        let der = SignedDataBuilder::default()
            .signed_content(CONTENT.to_vec())
            .certificate(cert.clone())
            .signer(SignerBuilder::new(&key, cert).digest_algorithm(DigestAlgorithm::Sha384))
            .build_der()
            .unwrap();

        let report = Verifier::new(DigestAlgorithm::Sha384)
            .verify(&der, None, None)
            .unwrap();

        assert_eq!(report.outcome(), VerificationOutcome::Valid);
    }
}
