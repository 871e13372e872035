// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

/*! Functionality for signing data. */

use {
    crate::{
        asn1::{
            common::Time,
            rfc3280::GeneralName,
            rfc5035::{EssCertIdV2, IssuerSerial, SigningCertificateV2, OID_SIGNING_CERTIFICATE_V2},
            rfc5280::AlgorithmIdentifier,
            rfc5652::{
                Attribute, AttributeOrder, AttributeValue, CertificateChoices, CertificateSet,
                CmsVersion, DigestAlgorithmIdentifiers, EncapsulatedContentInfo, SignedAttributes,
                SignedData, SignerIdentifier, SignerInfo, SignerInfos, OID_CONTENT_TYPE,
                OID_ID_DATA, OID_MESSAGE_DIGEST, OID_SIGNING_TIME,
            },
        },
        certificate::Certificate,
        CmsError, DigestAlgorithm, SignatureAlgorithm, SigningKey,
    },
    bcder::{
        encode::{PrimitiveContent, Values},
        Captured, Mode, OctetString, Oid,
    },
    bytes::Bytes,
};

/// Builder type to construct an entity that will sign some data.
///
/// Instances will be attached to [SignedDataBuilder] instances where they
/// will sign data using configured settings.
pub struct SignerBuilder<'a> {
    /// The cryptographic key pair used for signing content.
    signing_key: &'a SigningKey,

    /// X.509 certificate used for signing.
    signing_certificate: Certificate,

    /// Content digest algorithm to use.
    digest_algorithm: DigestAlgorithm,

    /// The content type of the value being signed.
    ///
    /// This is a mandatory field for signed attributes. The default value
    /// is `id-data`.
    content_type: Oid,

    /// Whether to emit a plain signature without any signed attributes.
    ///
    /// RFC 5652 makes signed attributes mandatory when the content type is
    /// not `id-data`, so this only makes sense with the default content
    /// type.
    plain_signature: bool,

    /// Whether to bind the signing certificate via a
    /// signing-certificate-v2 attribute.
    include_signing_certificate_v2: bool,

    /// Explicit signing time to use instead of the time of signing.
    signing_time: Option<chrono::DateTime<chrono::Utc>>,

    /// Extra attributes to include in the SignedAttributes set.
    extra_signed_attributes: Vec<Attribute>,
}

impl<'a> SignerBuilder<'a> {
    /// Construct a new entity that will sign content.
    ///
    /// An entity is constructed from a signing key and the X.509
    /// certificate it belongs to, both of which are mandatory.
    pub fn new(signing_key: &'a SigningKey, signing_certificate: Certificate) -> Self {
        Self {
            signing_key,
            signing_certificate,
            digest_algorithm: DigestAlgorithm::Sha256,
            content_type: Oid(Bytes::copy_from_slice(OID_ID_DATA.as_ref())),
            plain_signature: false,
            include_signing_certificate_v2: true,
            signing_time: None,
            extra_signed_attributes: Vec::new(),
        }
    }

    /// Obtain the signature algorithm used by the signing key.
    pub fn signature_algorithm(&self) -> SignatureAlgorithm {
        SignatureAlgorithm::from(self.signing_key)
    }

    /// Define the digest algorithm used when signing.
    pub fn digest_algorithm(mut self, algorithm: DigestAlgorithm) -> Self {
        self.digest_algorithm = algorithm;
        self
    }

    /// Define the content type of the value being signed.
    pub fn content_type(mut self, oid: Oid) -> Self {
        self.content_type = oid;
        self
    }

    /// Emit a signature over the content itself rather than signed attributes.
    ///
    /// This suppresses the content-type, signing-time, message-digest, and
    /// signing-certificate-v2 attributes entirely. Some legacy protocols
    /// require this form.
    pub fn plain_signature(mut self, plain: bool) -> Self {
        self.plain_signature = plain;
        self
    }

    /// Control emission of the signing-certificate-v2 signed attribute.
    ///
    /// Enabled by default.
    pub fn include_signing_certificate_v2(mut self, include: bool) -> Self {
        self.include_signing_certificate_v2 = include;
        self
    }

    /// Use a specific signing time instead of the time of signing.
    pub fn signing_time(mut self, time: chrono::DateTime<chrono::Utc>) -> Self {
        self.signing_time = Some(time);
        self
    }

    /// Add an additional attribute to sign.
    pub fn signed_attribute(mut self, typ: Oid, values: Vec<AttributeValue>) -> Self {
        self.extra_signed_attributes.push(Attribute { typ, values });
        self
    }

    /// Add an additional OctetString signed attribute.
    ///
    /// This is a helper for converting a byte slice to an OctetString and
    /// adding it as a signed attribute.
    pub fn signed_attribute_octet_string(self, typ: Oid, data: &[u8]) -> Self {
        self.signed_attribute(
            typ,
            vec![AttributeValue::new(Captured::from_values(
                Mode::Der,
                OctetString::new(Bytes::copy_from_slice(data)).encode(),
            ))],
        )
    }
}

/// Entity for incrementally deriving a SignedData primitive.
///
/// Use this type for generating an RFC 5652 payload for signed data.
///
/// By default, the encapsulated content is carried inline (an *attached*
/// signature). [SignedDataBuilder::detached] omits it, leaving the caller
/// to convey the content out of band. When only a digest of the content is
/// available, [SignedDataBuilder::external_message_digest] supplies it; the
/// signature is necessarily detached in that mode.
#[derive(Default)]
pub struct SignedDataBuilder<'a> {
    /// Encapsulated content to sign.
    content: Option<Vec<u8>>,

    /// Whether to omit the encapsulated content from the final payload.
    detached: bool,

    /// Pre-computed digest of the content, when the content itself is not
    /// available.
    external_digest: Option<Vec<u8>>,

    /// Entities who will sign the content.
    signers: Vec<SignerBuilder<'a>>,

    /// X.509 certificates to add to the payload.
    certificates: Vec<crate::asn1::rfc5280::Certificate>,
}

impl<'a> SignedDataBuilder<'a> {
    /// Define the content to sign.
    ///
    /// This content will be embedded in the generated payload unless
    /// [SignedDataBuilder::detached] is set.
    pub fn signed_content(mut self, data: Vec<u8>) -> Self {
        self.content = Some(data);
        self
    }

    /// Omit the encapsulated content from the generated payload.
    ///
    /// Verifiers will need to be given the content through another channel.
    pub fn detached(mut self, detached: bool) -> Self {
        self.detached = detached;
        self
    }

    /// Supply a pre-computed digest of the content being signed.
    ///
    /// The digest must have been computed with each signer's digest
    /// algorithm. Since the content itself is not available, this mode
    /// requires [SignedDataBuilder::detached] and is incompatible with
    /// [SignerBuilder::plain_signature].
    pub fn external_message_digest(mut self, digest: Vec<u8>) -> Self {
        self.external_digest = Some(digest);
        self
    }

    /// Add a signer.
    ///
    /// The signer is the thing generating the cryptographic signature over
    /// data to be signed.
    pub fn signer(mut self, signer: SignerBuilder<'a>) -> Self {
        self.signers.push(signer);
        self
    }

    /// Add a certificate defined by our crate's Certificate type.
    ///
    /// Duplicate certificates are skipped.
    pub fn certificate(mut self, cert: Certificate) -> Self {
        let cert = cert.raw_certificate().clone();

        if !self.certificates.iter().any(|x| x == &cert) {
            self.certificates.push(cert);
        }

        self
    }

    /// Add multiple certificates to the certificates list.
    pub fn certificates(mut self, certs: impl Iterator<Item = Certificate>) -> Self {
        for cert in certs {
            self = self.certificate(cert);
        }

        self
    }

    /// Construct a DER-encoded ASN.1 document containing a SignedData object.
    pub fn build_der(&self) -> Result<Vec<u8>, CmsError> {
        if self.external_digest.is_some() && !self.detached {
            return Err(CmsError::InvalidContentCombination);
        }

        let mut signer_infos = SignerInfos::default();
        let mut digest_algorithms = DigestAlgorithmIdentifiers::default();

        for signer in &self.signers {
            let digest_algorithm = AlgorithmIdentifier::from(signer.digest_algorithm);

            if !digest_algorithms.contains(&digest_algorithm) {
                digest_algorithms.push(digest_algorithm.clone());
            }

            let signed_attributes = if signer.plain_signature {
                None
            } else {
                let message_digest = if let Some(digest) = &self.external_digest {
                    digest.clone()
                } else if let Some(content) = &self.content {
                    signer.digest_algorithm.digest_data(content)
                } else {
                    return Err(CmsError::MissingContent);
                };

                let signing_time = Time::from(signer.signing_time.unwrap_or_else(chrono::Utc::now));

                let mut attributes = vec![
                    Attribute::single(
                        Oid(Bytes::copy_from_slice(OID_CONTENT_TYPE.as_ref())),
                        signer.content_type.encode_ref(),
                    ),
                    Attribute::single(
                        Oid(Bytes::copy_from_slice(OID_SIGNING_TIME.as_ref())),
                        signing_time.encode_ref(),
                    ),
                    Attribute::single(
                        Oid(Bytes::copy_from_slice(OID_MESSAGE_DIGEST.as_ref())),
                        OctetString::new(Bytes::from(message_digest)).encode(),
                    ),
                ];

                if signer.include_signing_certificate_v2 {
                    let cert = &signer.signing_certificate;

                    let signing_certificate = SigningCertificateV2 {
                        certs: vec![EssCertIdV2 {
                            // SHA-256 is the DEFAULT and is omitted from the
                            // encoding when in effect.
                            hash_algorithm: if signer.digest_algorithm == DigestAlgorithm::Sha256 {
                                None
                            } else {
                                Some(signer.digest_algorithm.into())
                            },
                            cert_hash: OctetString::new(Bytes::from(
                                cert.fingerprint(signer.digest_algorithm),
                            )),
                            issuer_serial: Some(IssuerSerial {
                                issuer: vec![GeneralName::DirectoryName(cert.issuer().clone())],
                                serial_number: cert.serial_number().clone(),
                            }),
                        }],
                    };

                    attributes.push(Attribute::single(
                        Oid(Bytes::copy_from_slice(OID_SIGNING_CERTIFICATE_V2.as_ref())),
                        signing_certificate.encode_ref(),
                    ));
                }

                attributes.extend(signer.extra_signed_attributes.iter().cloned());

                // Sort now so the wire order matches the order used when
                // computing the signature.
                Some(SignedAttributes::from(attributes).as_canonical())
            };

            let signature_message = match &signed_attributes {
                Some(attributes) => attributes.digested_content(AttributeOrder::Canonical)?,
                None => self.content.clone().ok_or(CmsError::MissingContent)?,
            };

            let signature = signer.signing_key.sign(&signature_message)?;

            signer_infos.push(SignerInfo {
                version: CmsVersion::V1,
                sid: SignerIdentifier::IssuerAndSerialNumber((&signer.signing_certificate).into()),
                digest_algorithm,
                signed_attributes,
                signature_algorithm: signer.signature_algorithm().into(),
                signature: OctetString::new(Bytes::from(signature)),
                unsigned_attributes: None,
                signed_attributes_data: None,
            });
        }

        let certificates = if self.certificates.is_empty() {
            None
        } else {
            let mut certs = CertificateSet::default();

            for cert in &self.certificates {
                certs.push(CertificateChoices::Certificate(Box::new(cert.clone())));
            }

            Some(certs)
        };

        let signed_data = SignedData {
            version: CmsVersion::V1,
            digest_algorithms,
            content_info: EncapsulatedContentInfo {
                content_type: Oid(Bytes::copy_from_slice(OID_ID_DATA.as_ref())),
                content: if self.detached {
                    None
                } else {
                    self.content
                        .as_ref()
                        .map(|content| OctetString::new(Bytes::copy_from_slice(content)))
                },
            },
            certificates,
            signer_infos,
        };

        let mut buffer = Vec::new();
        signed_data
            .encode_ref()
            .write_encoded(Mode::Der, &mut buffer)?;

        Ok(buffer)
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::{
            algorithm::EcdsaCurve,
            asn1::rfc5652::{SignedData, OID_ID_SIGNED_DATA},
            testutil::{self, rsa_cert, rsa_private_key},
            KeyAlgorithm,
        },
        bcder::decode::Constructed,
    };

    fn find_attribute<'a>(
        attributes: &'a SignedAttributes,
        oid: &bcder::ConstOid,
    ) -> Option<&'a Attribute> {
        attributes.iter().find(|attr| attr.typ == *oid)
    }

    #[test]
    fn simple_rsa_signature() {
        let key = rsa_private_key();
        let cert = rsa_cert();

        let der = SignedDataBuilder::default()
            .signed_content(b"hello world".to_vec())
            .certificate(cert.clone())
            .signer(SignerBuilder::new(&key, cert))
            .build_der()
            .unwrap();

        let signed_data = SignedData::decode_der(&der).unwrap();

        assert_eq!(signed_data.version, CmsVersion::V1);
        assert_eq!(signed_data.digest_algorithms.len(), 1);
        assert_eq!(signed_data.content_info.content_type, OID_ID_DATA);
        assert_eq!(
            signed_data
                .content_info
                .content
                .as_ref()
                .unwrap()
                .to_bytes()
                .as_ref(),
            b"hello world"
        );
        assert_eq!(signed_data.certificates.as_ref().unwrap().len(), 1);
        assert_eq!(signed_data.signer_infos.len(), 1);

        let signer_info = &signed_data.signer_infos[0];
        assert_eq!(signer_info.version, CmsVersion::V1);
        assert!(matches!(
            signer_info.sid,
            SignerIdentifier::IssuerAndSerialNumber(_)
        ));

        let attributes = signer_info.signed_attributes.as_ref().unwrap();
        assert_eq!(&attributes.as_canonical(), attributes);

        assert!(find_attribute(attributes, &OID_CONTENT_TYPE).is_some());
        assert!(find_attribute(attributes, &OID_SIGNING_TIME).is_some());
        assert!(find_attribute(attributes, &OID_SIGNING_CERTIFICATE_V2).is_some());

        let message_digest = find_attribute(attributes, &OID_MESSAGE_DIGEST).unwrap();
        assert_eq!(message_digest.values.len(), 1);

        let digest =
            Constructed::decode(message_digest.values[0].as_slice(), Mode::Der, |cons| {
                OctetString::take_from(cons)
            })
            .unwrap();

        assert_eq!(
            digest.to_bytes().as_ref(),
            DigestAlgorithm::Sha256.digest_data(b"hello world")
        );
    }

    #[test]
    fn signature_verifies_with_ring() {
        let key = rsa_private_key();
        let cert = rsa_cert();

        let der = SignedDataBuilder::default()
            .signed_content(b"hello world".to_vec())
            .signer(SignerBuilder::new(&key, cert.clone()))
            .build_der()
            .unwrap();

        let signed_data = SignedData::decode_der(&der).unwrap();
        let signer_info = &signed_data.signer_infos[0];

        let signed_content = signer_info
            .signed_attributes_digested_content(AttributeOrder::Canonical)
            .unwrap()
            .unwrap();

        let verifier = SignatureAlgorithm::Sha256Rsa
            .resolve_verification_algorithm(cert.public_key().algorithm)
            .unwrap();

        ring::signature::UnparsedPublicKey::new(verifier, &cert.public_key().key)
            .verify(&signed_content, &signer_info.signature.to_bytes())
            .unwrap();
    }

    #[test]
    fn plain_signature_has_no_signed_attributes() {
        let key = rsa_private_key();
        let cert = rsa_cert();

        let der = SignedDataBuilder::default()
            .signed_content(b"hello world".to_vec())
            .signer(SignerBuilder::new(&key, cert.clone()).plain_signature(true))
            .build_der()
            .unwrap();

        let signed_data = SignedData::decode_der(&der).unwrap();
        let signer_info = &signed_data.signer_infos[0];

        assert!(signer_info.signed_attributes.is_none());

        // The signature is over the raw content.
        let verifier = SignatureAlgorithm::Sha256Rsa
            .resolve_verification_algorithm(cert.public_key().algorithm)
            .unwrap();

        ring::signature::UnparsedPublicKey::new(verifier, &cert.public_key().key)
            .verify(b"hello world", &signer_info.signature.to_bytes())
            .unwrap();
    }

    #[test]
    fn detached_signature_omits_content() {
        let key = rsa_private_key();
        let cert = rsa_cert();

        let der = SignedDataBuilder::default()
            .signed_content(b"hello world".to_vec())
            .detached(true)
            .signer(SignerBuilder::new(&key, cert))
            .build_der()
            .unwrap();

        let signed_data = SignedData::decode_der(&der).unwrap();

        assert!(signed_data.content_info.content.is_none());
        assert!(signed_data.signer_infos[0].signed_attributes.is_some());
    }

    #[test]
    fn external_digest_requires_detached() {
        let key = rsa_private_key();
        let cert = rsa_cert();

        let digest = DigestAlgorithm::Sha256.digest_data(b"hello world");

        let err = SignedDataBuilder::default()
            .external_message_digest(digest.clone())
            .signer(SignerBuilder::new(&key, cert.clone()))
            .build_der()
            .unwrap_err();

        assert!(matches!(err, CmsError::InvalidContentCombination));

        let der = SignedDataBuilder::default()
            .external_message_digest(digest.clone())
            .detached(true)
            .signer(SignerBuilder::new(&key, cert))
            .build_der()
            .unwrap();

        let signed_data = SignedData::decode_der(&der).unwrap();
        let attributes = signed_data.signer_infos[0]
            .signed_attributes
            .as_ref()
            .unwrap();

        let message_digest = find_attribute(attributes, &OID_MESSAGE_DIGEST).unwrap();
        let value =
            Constructed::decode(message_digest.values[0].as_slice(), Mode::Der, |cons| {
                OctetString::take_from(cons)
            })
            .unwrap();

        assert_eq!(value.to_bytes().as_ref(), digest.as_slice());
    }

    #[test]
    fn no_content_is_an_error() {
        let key = rsa_private_key();
        let cert = rsa_cert();

        let err = SignedDataBuilder::default()
            .signer(SignerBuilder::new(&key, cert))
            .build_der()
            .unwrap_err();

        assert!(matches!(err, CmsError::MissingContent));
    }

    #[test]
    fn multiple_signers() {
        let rsa_key = rsa_private_key();
        let rsa_signer_cert = rsa_cert();

        let (ec_cert, ec_key) = testutil::self_signed_key_pair(
            KeyAlgorithm::Ecdsa(EcdsaCurve::Secp256r1),
            "ec signer",
            1,
        );

        let der = SignedDataBuilder::default()
            .signed_content(b"hello world".to_vec())
            .certificate(rsa_signer_cert.clone())
            .certificate(ec_cert.clone())
            .signer(SignerBuilder::new(&rsa_key, rsa_signer_cert))
            .signer(SignerBuilder::new(&ec_key, ec_cert).digest_algorithm(DigestAlgorithm::Sha384))
            .build_der()
            .unwrap();

        let signed_data = SignedData::decode_der(&der).unwrap();

        assert_eq!(signed_data.signer_infos.len(), 2);
        assert_eq!(signed_data.digest_algorithms.len(), 2);
        assert_eq!(signed_data.certificates.as_ref().unwrap().len(), 2);
    }

    #[test]
    fn duplicate_certificates_are_deduplicated() {
        let key = rsa_private_key();
        let cert = rsa_cert();

        let der = SignedDataBuilder::default()
            .signed_content(b"hello world".to_vec())
            .certificate(cert.clone())
            .certificate(cert.clone())
            .signer(SignerBuilder::new(&key, cert))
            .build_der()
            .unwrap();

        let signed_data = SignedData::decode_der(&der).unwrap();
        assert_eq!(signed_data.certificates.as_ref().unwrap().len(), 1);
    }

    #[test]
    fn ed25519_signer() {
        let (cert, key) = testutil::self_signed_key_pair(KeyAlgorithm::Ed25519, "ed signer", 2);

        let der = SignedDataBuilder::default()
            .signed_content(b"hello world".to_vec())
            .certificate(cert.clone())
            .signer(SignerBuilder::new(&key, cert))
            .build_der()
            .unwrap();

        let signed_data = SignedData::decode_der(&der).unwrap();
        assert_eq!(
            SignatureAlgorithm::try_from(&signed_data.signer_infos[0].signature_algorithm)
                .unwrap(),
            SignatureAlgorithm::Ed25519
        );
    }

    #[test]
    fn scv2_hash_algorithm_default_omitted() {
        let key = rsa_private_key();
        let cert = rsa_cert();

        let der = SignedDataBuilder::default()
            .signed_content(b"hello world".to_vec())
            .signer(SignerBuilder::new(&key, cert.clone()))
            .build_der()
            .unwrap();

        let signed_data = SignedData::decode_der(&der).unwrap();
        let attributes = signed_data.signer_infos[0]
            .signed_attributes
            .as_ref()
            .unwrap();

        let attribute = find_attribute(attributes, &OID_SIGNING_CERTIFICATE_V2).unwrap();
        let scv2 = SigningCertificateV2::decode_der(attribute.values[0].as_slice()).unwrap();

        assert_eq!(scv2.certs.len(), 1);
        assert!(scv2.certs[0].hash_algorithm.is_none());
        assert_eq!(
            scv2.certs[0].cert_hash.to_bytes().as_ref(),
            cert.fingerprint(DigestAlgorithm::Sha256)
        );
        assert!(scv2.certs[0].issuer_serial.is_some());
    }

    #[test]
    fn content_info_type_is_signed_data() {
        let key = rsa_private_key();
        let cert = rsa_cert();

        let der = SignedDataBuilder::default()
            .signed_content(b"hello world".to_vec())
            .signer(SignerBuilder::new(&key, cert))
            .build_der()
            .unwrap();

        // The outer ContentInfo names the signed-data content type.
        let oid = Constructed::decode(der.as_slice(), Mode::Der, |cons| {
            cons.take_sequence(|cons| {
                let oid = Oid::take_from(cons)?;
                cons.capture_all()?;
                Ok(oid)
            })
        })
        .unwrap();

        assert_eq!(oid, OID_ID_SIGNED_DATA);
    }
}
