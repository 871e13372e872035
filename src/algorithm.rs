// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Cryptographic algorithms and signing keys.

use {
    crate::{
        asn1::{rfc5280::AlgorithmIdentifier, rfc5958::OneAsymmetricKey},
        CmsError,
    },
    bcder::{decode::Constructed, ConstOid, Oid},
    ring::{
        digest,
        signature::{self as ringsig, KeyPair},
    },
    signature::{Signature as SignatureTrait, Signer},
    std::str::FromStr,
};

/// SHA-1 digest algorithm.
///
/// 1.3.14.3.2.26
const OID_SHA1: ConstOid = Oid(&[43, 14, 3, 2, 26]);

/// SHA-256 digest algorithm.
///
/// 2.16.840.1.101.3.4.2.1
const OID_SHA256: ConstOid = Oid(&[96, 134, 72, 1, 101, 3, 4, 2, 1]);

/// SHA-384 digest algorithm.
///
/// 2.16.840.1.101.3.4.2.2
const OID_SHA384: ConstOid = Oid(&[96, 134, 72, 1, 101, 3, 4, 2, 2]);

/// SHA-512 digest algorithm.
///
/// 2.16.840.1.101.3.4.2.3
const OID_SHA512: ConstOid = Oid(&[96, 134, 72, 1, 101, 3, 4, 2, 3]);

/// RSA+SHA-1 encryption.
///
/// 1.2.840.113549.1.1.5
const OID_SHA1_RSA: ConstOid = Oid(&[42, 134, 72, 134, 247, 13, 1, 1, 5]);

/// RSA+SHA-256 encryption.
///
/// 1.2.840.113549.1.1.11
const OID_SHA256_RSA: ConstOid = Oid(&[42, 134, 72, 134, 247, 13, 1, 1, 11]);

/// RSA+SHA-384 encryption.
///
/// 1.2.840.113549.1.1.12
const OID_SHA384_RSA: ConstOid = Oid(&[42, 134, 72, 134, 247, 13, 1, 1, 12]);

/// RSA+SHA-512 encryption.
///
/// 1.2.840.113549.1.1.13
const OID_SHA512_RSA: ConstOid = Oid(&[42, 134, 72, 134, 247, 13, 1, 1, 13]);

/// RSA encryption.
///
/// 1.2.840.113549.1.1.1
const OID_RSA: ConstOid = Oid(&[42, 134, 72, 134, 247, 13, 1, 1, 1]);

/// ECDSA with SHA-256.
///
/// 1.2.840.10045.4.3.2
const OID_ECDSA_SHA256: ConstOid = Oid(&[42, 134, 72, 206, 61, 4, 3, 2]);

/// ECDSA with SHA-384.
///
/// 1.2.840.10045.4.3.3
const OID_ECDSA_SHA384: ConstOid = Oid(&[42, 134, 72, 206, 61, 4, 3, 3]);

/// Elliptic curve public key cryptography.
///
/// 1.2.840.10045.2.1
pub(crate) const OID_EC_PUBLIC_KEY: ConstOid = Oid(&[42, 134, 72, 206, 61, 2, 1]);

/// Elliptic curve secp256r1 (NIST P-256).
///
/// 1.2.840.10045.3.1.7
const OID_EC_SECP256R1: ConstOid = Oid(&[42, 134, 72, 206, 61, 3, 1, 7]);

/// Elliptic curve secp384r1 (NIST P-384).
///
/// 1.3.132.0.34
const OID_EC_SECP384R1: ConstOid = Oid(&[43, 129, 4, 0, 34]);

/// ED25519 key agreement.
///
/// 1.3.101.110
const OID_ED25519_KEY_AGREEMENT: ConstOid = Oid(&[43, 101, 110]);

/// Edwards curve digital signature algorithm.
///
/// 1.3.101.112
const OID_ED25519_SIGNATURE_ALGORITHM: ConstOid = Oid(&[43, 101, 112]);

/// A hashing algorithm used for digesting data.
///
/// Instances can be converted to and from [Oid] and the ASN.1
/// [AlgorithmIdentifier] via `From`/`Into`/`TryFrom`.
///
/// Instances can be parsed from common string spellings like `SHA-256`
/// and `sha256` via [FromStr].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum DigestAlgorithm {
    /// SHA-1.
    ///
    /// Corresponds to OID 1.3.14.3.2.26.
    Sha1,

    /// SHA-256.
    ///
    /// Corresponds to OID 2.16.840.1.101.3.4.2.1.
    Sha256,

    /// SHA-384.
    ///
    /// Corresponds to OID 2.16.840.1.101.3.4.2.2.
    Sha384,

    /// SHA-512.
    ///
    /// Corresponds to OID 2.16.840.1.101.3.4.2.3.
    Sha512,
}

impl From<DigestAlgorithm> for Oid {
    fn from(alg: DigestAlgorithm) -> Self {
        Oid(match alg {
            DigestAlgorithm::Sha1 => OID_SHA1.as_ref(),
            DigestAlgorithm::Sha256 => OID_SHA256.as_ref(),
            DigestAlgorithm::Sha384 => OID_SHA384.as_ref(),
            DigestAlgorithm::Sha512 => OID_SHA512.as_ref(),
        }
        .into())
    }
}

impl TryFrom<&Oid> for DigestAlgorithm {
    type Error = CmsError;

    fn try_from(v: &Oid) -> Result<Self, Self::Error> {
        if v == &OID_SHA1 {
            Ok(Self::Sha1)
        } else if v == &OID_SHA256 {
            Ok(Self::Sha256)
        } else if v == &OID_SHA384 {
            Ok(Self::Sha384)
        } else if v == &OID_SHA512 {
            Ok(Self::Sha512)
        } else {
            Err(CmsError::UnknownDigestAlgorithm(format!("{}", v)))
        }
    }
}

impl TryFrom<&AlgorithmIdentifier> for DigestAlgorithm {
    type Error = CmsError;

    fn try_from(v: &AlgorithmIdentifier) -> Result<Self, Self::Error> {
        Self::try_from(&v.algorithm)
    }
}

impl From<DigestAlgorithm> for AlgorithmIdentifier {
    fn from(alg: DigestAlgorithm) -> Self {
        Self {
            algorithm: alg.into(),
            parameters: None,
        }
    }
}

impl From<DigestAlgorithm> for digest::Context {
    fn from(alg: DigestAlgorithm) -> Self {
        digest::Context::new(match alg {
            DigestAlgorithm::Sha1 => &digest::SHA1_FOR_LEGACY_USE_ONLY,
            DigestAlgorithm::Sha256 => &digest::SHA256,
            DigestAlgorithm::Sha384 => &digest::SHA384,
            DigestAlgorithm::Sha512 => &digest::SHA512,
        })
    }
}

impl FromStr for DigestAlgorithm {
    type Err = CmsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "").as_str() {
            "sha1" => Ok(Self::Sha1),
            "sha256" => Ok(Self::Sha256),
            "sha384" => Ok(Self::Sha384),
            "sha512" => Ok(Self::Sha512),
            _ => Err(CmsError::UnsupportedAlgorithm(s.to_string())),
        }
    }
}

impl DigestAlgorithm {
    /// Obtain an object that can be used to digest content using this algorithm.
    pub fn digester(&self) -> digest::Context {
        digest::Context::from(*self)
    }

    /// Digest a slice of data in one shot.
    pub fn digest_data(&self, data: &[u8]) -> Vec<u8> {
        let mut h = self.digester();
        h.update(data);
        h.finish().as_ref().to_vec()
    }
}

/// Compute the digest of a message with a named algorithm.
///
/// The algorithm name accepts the spellings recognized by the [FromStr]
/// implementation on [DigestAlgorithm].
pub fn digest(message: &[u8], algorithm: &str) -> Result<Vec<u8>, CmsError> {
    Ok(DigestAlgorithm::from_str(algorithm)?.digest_data(message))
}

/// An elliptic curve supported for ECDSA keys.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum EcdsaCurve {
    Secp256r1,
    Secp384r1,
}

impl EcdsaCurve {
    /// Obtain all variants of this enumeration.
    pub fn all() -> &'static [Self] {
        &[Self::Secp256r1, Self::Secp384r1]
    }
}

impl TryFrom<&Oid> for EcdsaCurve {
    type Error = CmsError;

    fn try_from(v: &Oid) -> Result<Self, Self::Error> {
        if v == &OID_EC_SECP256R1 {
            Ok(Self::Secp256r1)
        } else if v == &OID_EC_SECP384R1 {
            Ok(Self::Secp384r1)
        } else {
            Err(CmsError::UnknownEllipticCurve(format!("{}", v)))
        }
    }
}

impl From<EcdsaCurve> for Oid {
    fn from(curve: EcdsaCurve) -> Self {
        Oid(match curve {
            EcdsaCurve::Secp256r1 => OID_EC_SECP256R1.as_ref(),
            EcdsaCurve::Secp384r1 => OID_EC_SECP384R1.as_ref(),
        }
        .into())
    }
}

impl From<EcdsaCurve> for &'static ringsig::EcdsaSigningAlgorithm {
    fn from(curve: EcdsaCurve) -> Self {
        // ring refuses to mix and match the bitness of curves and digests
        // when signing, so each curve maps to exactly one algorithm.
        match curve {
            EcdsaCurve::Secp256r1 => &ringsig::ECDSA_P256_SHA256_ASN1_SIGNING,
            EcdsaCurve::Secp384r1 => &ringsig::ECDSA_P384_SHA384_ASN1_SIGNING,
        }
    }
}

/// An algorithm used to digitally sign content.
///
/// Instances can be converted to/from [Oid] and the ASN.1
/// [AlgorithmIdentifier] via `From`/`Into`/`TryFrom`.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum SignatureAlgorithm {
    /// SHA-1 with RSA encryption.
    ///
    /// Corresponds to OID 1.2.840.113549.1.1.5.
    Sha1Rsa,

    /// SHA-256 with RSA encryption.
    ///
    /// Corresponds to OID 1.2.840.113549.1.1.11.
    Sha256Rsa,

    /// SHA-384 with RSA encryption.
    ///
    /// Corresponds to OID 1.2.840.113549.1.1.12.
    Sha384Rsa,

    /// SHA-512 with RSA encryption.
    ///
    /// Corresponds to OID 1.2.840.113549.1.1.13.
    Sha512Rsa,

    /// ECDSA with SHA-256.
    ///
    /// Corresponds to OID 1.2.840.10045.4.3.2.
    EcdsaSha256,

    /// ECDSA with SHA-384.
    ///
    /// Corresponds to OID 1.2.840.10045.4.3.3.
    EcdsaSha384,

    /// ED25519.
    ///
    /// Corresponds to OID 1.3.101.112.
    Ed25519,
}

impl SignatureAlgorithm {
    /// Resolve an instance from a signatureAlgorithm field plus digest algorithm.
    ///
    /// Some producers emit the bare key algorithm OID (e.g. `rsaEncryption`)
    /// in `SignerInfo.signatureAlgorithm` rather than a combined
    /// signature algorithm OID. In that case, the signer's digest algorithm
    /// disambiguates which signature algorithm is in use.
    pub fn from_oid_and_digest_algorithm(
        oid: &Oid,
        digest_algorithm: DigestAlgorithm,
    ) -> Result<Self, CmsError> {
        if let Ok(alg) = Self::try_from(oid) {
            return Ok(alg);
        }

        if oid == &OID_RSA {
            Ok(match digest_algorithm {
                DigestAlgorithm::Sha1 => Self::Sha1Rsa,
                DigestAlgorithm::Sha256 => Self::Sha256Rsa,
                DigestAlgorithm::Sha384 => Self::Sha384Rsa,
                DigestAlgorithm::Sha512 => Self::Sha512Rsa,
            })
        } else if oid == &OID_EC_PUBLIC_KEY {
            match digest_algorithm {
                DigestAlgorithm::Sha256 => Ok(Self::EcdsaSha256),
                DigestAlgorithm::Sha384 => Ok(Self::EcdsaSha384),
                _ => Err(CmsError::UnknownSignatureAlgorithm(format!("{}", oid))),
            }
        } else if oid == &OID_ED25519_KEY_AGREEMENT {
            Ok(Self::Ed25519)
        } else {
            Err(CmsError::UnknownSignatureAlgorithm(format!("{}", oid)))
        }
    }

    /// Attempt to resolve the verification algorithm for a given key algorithm.
    ///
    /// ring's verification primitives are specific to both the key type and
    /// the digest, so this can fail when the signer's certificate carries a
    /// key that cannot produce signatures of this kind.
    pub fn resolve_verification_algorithm(
        &self,
        key_algorithm: KeyAlgorithm,
    ) -> Result<&'static dyn ringsig::VerificationAlgorithm, CmsError> {
        match (key_algorithm, self) {
            (KeyAlgorithm::Rsa, Self::Sha1Rsa) => {
                Ok(&ringsig::RSA_PKCS1_2048_8192_SHA1_FOR_LEGACY_USE_ONLY)
            }
            (KeyAlgorithm::Rsa, Self::Sha256Rsa) => Ok(&ringsig::RSA_PKCS1_2048_8192_SHA256),
            (KeyAlgorithm::Rsa, Self::Sha384Rsa) => Ok(&ringsig::RSA_PKCS1_2048_8192_SHA384),
            (KeyAlgorithm::Rsa, Self::Sha512Rsa) => Ok(&ringsig::RSA_PKCS1_2048_8192_SHA512),
            (KeyAlgorithm::Ecdsa(EcdsaCurve::Secp256r1), Self::EcdsaSha256) => {
                Ok(&ringsig::ECDSA_P256_SHA256_ASN1)
            }
            (KeyAlgorithm::Ecdsa(EcdsaCurve::Secp256r1), Self::EcdsaSha384) => {
                Ok(&ringsig::ECDSA_P256_SHA384_ASN1)
            }
            (KeyAlgorithm::Ecdsa(EcdsaCurve::Secp384r1), Self::EcdsaSha256) => {
                Ok(&ringsig::ECDSA_P384_SHA256_ASN1)
            }
            (KeyAlgorithm::Ecdsa(EcdsaCurve::Secp384r1), Self::EcdsaSha384) => {
                Ok(&ringsig::ECDSA_P384_SHA384_ASN1)
            }
            (KeyAlgorithm::Ed25519, Self::Ed25519) => Ok(&ringsig::ED25519),
            (key_algorithm, _) => Err(CmsError::UnsupportedSignatureVerification(
                key_algorithm,
                *self,
            )),
        }
    }
}

impl From<SignatureAlgorithm> for Oid {
    fn from(alg: SignatureAlgorithm) -> Self {
        Oid(match alg {
            SignatureAlgorithm::Sha1Rsa => OID_SHA1_RSA.as_ref(),
            SignatureAlgorithm::Sha256Rsa => OID_SHA256_RSA.as_ref(),
            SignatureAlgorithm::Sha384Rsa => OID_SHA384_RSA.as_ref(),
            SignatureAlgorithm::Sha512Rsa => OID_SHA512_RSA.as_ref(),
            SignatureAlgorithm::EcdsaSha256 => OID_ECDSA_SHA256.as_ref(),
            SignatureAlgorithm::EcdsaSha384 => OID_ECDSA_SHA384.as_ref(),
            SignatureAlgorithm::Ed25519 => OID_ED25519_SIGNATURE_ALGORITHM.as_ref(),
        }
        .into())
    }
}

impl TryFrom<&Oid> for SignatureAlgorithm {
    type Error = CmsError;

    fn try_from(v: &Oid) -> Result<Self, Self::Error> {
        if v == &OID_SHA1_RSA {
            Ok(Self::Sha1Rsa)
        } else if v == &OID_SHA256_RSA {
            Ok(Self::Sha256Rsa)
        } else if v == &OID_SHA384_RSA {
            Ok(Self::Sha384Rsa)
        } else if v == &OID_SHA512_RSA {
            Ok(Self::Sha512Rsa)
        } else if v == &OID_ECDSA_SHA256 {
            Ok(Self::EcdsaSha256)
        } else if v == &OID_ECDSA_SHA384 {
            Ok(Self::EcdsaSha384)
        } else if v == &OID_ED25519_SIGNATURE_ALGORITHM {
            Ok(Self::Ed25519)
        } else {
            Err(CmsError::UnknownSignatureAlgorithm(format!("{}", v)))
        }
    }
}

impl TryFrom<&AlgorithmIdentifier> for SignatureAlgorithm {
    type Error = CmsError;

    fn try_from(v: &AlgorithmIdentifier) -> Result<Self, Self::Error> {
        Self::try_from(&v.algorithm)
    }
}

impl From<SignatureAlgorithm> for AlgorithmIdentifier {
    fn from(alg: SignatureAlgorithm) -> Self {
        Self {
            algorithm: alg.into(),
            parameters: None,
        }
    }
}

/// Cryptographic algorithm used by a private or public key.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum KeyAlgorithm {
    /// RSA.
    ///
    /// Corresponds to OID 1.2.840.113549.1.1.1.
    Rsa,

    /// Corresponds to OID 1.2.840.10045.2.1.
    Ecdsa(EcdsaCurve),

    /// Corresponds to OID 1.3.101.110.
    Ed25519,
}

impl TryFrom<&Oid> for KeyAlgorithm {
    type Error = CmsError;

    fn try_from(v: &Oid) -> Result<Self, Self::Error> {
        if v == &OID_RSA {
            Ok(Self::Rsa)
        // The OID doesn't say which curve is in use. That's stored in the
        // algorithm parameters, which callers with access to a full
        // AlgorithmIdentifier should prefer. Assume p256 as a default.
        } else if v == &OID_EC_PUBLIC_KEY {
            Ok(Self::Ecdsa(EcdsaCurve::Secp256r1))
        // ED25519 appears to use the signature algorithm OID for private key
        // identification, so we need to accept both.
        } else if v == &OID_ED25519_KEY_AGREEMENT || v == &OID_ED25519_SIGNATURE_ALGORITHM {
            Ok(Self::Ed25519)
        } else {
            Err(CmsError::UnknownKeyAlgorithm(format!("{}", v)))
        }
    }
}

impl TryFrom<&AlgorithmIdentifier> for KeyAlgorithm {
    type Error = CmsError;

    fn try_from(v: &AlgorithmIdentifier) -> Result<Self, Self::Error> {
        let algorithm = Self::try_from(&v.algorithm)?;

        if matches!(algorithm, Self::Ecdsa(_)) {
            let params = v
                .parameters
                .as_ref()
                .ok_or_else(|| CmsError::UnknownEllipticCurve("no parameters".to_string()))?;

            let curve_oid = params
                .decode_oid()
                .map_err(|_| CmsError::UnknownEllipticCurve("invalid parameters".to_string()))?;

            Ok(Self::Ecdsa(EcdsaCurve::try_from(&curve_oid)?))
        } else {
            Ok(algorithm)
        }
    }
}

impl From<KeyAlgorithm> for Oid {
    fn from(alg: KeyAlgorithm) -> Self {
        Oid(match alg {
            KeyAlgorithm::Rsa => OID_RSA.as_ref(),
            KeyAlgorithm::Ecdsa(_) => OID_EC_PUBLIC_KEY.as_ref(),
            KeyAlgorithm::Ed25519 => OID_ED25519_KEY_AGREEMENT.as_ref(),
        }
        .into())
    }
}

/// A created signature.
#[derive(Clone, Debug)]
pub struct Signature(Vec<u8>);

impl From<Vec<u8>> for Signature {
    fn from(v: Vec<u8>) -> Self {
        Self(v)
    }
}

impl From<Signature> for Vec<u8> {
    fn from(v: Signature) -> Vec<u8> {
        v.0
    }
}

impl AsRef<[u8]> for Signature {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl SignatureTrait for Signature {
    fn from_bytes(bytes: &[u8]) -> Result<Self, signature::Error> {
        Ok(Self(bytes.to_vec()))
    }
}

/// Represents a key used for signing content.
///
/// This is a wrapper around ring's key types supporting signing. We only
/// care about the private key as this type should only be used for signing.
#[derive(Debug)]
pub enum SigningKey {
    /// ECDSA key pair and the curve it operates on.
    Ecdsa(ringsig::EcdsaKeyPair, EcdsaCurve),

    /// ED25519 key pair.
    Ed25519(ringsig::Ed25519KeyPair),

    /// RSA key pair.
    Rsa(ringsig::RsaKeyPair),
}

impl SigningKey {
    /// Attempt to instantiate an instance from PKCS#8 DER data.
    ///
    /// The document should be a [OneAsymmetricKey] data structure and should
    /// contain both the private and public key. For ECDSA keys, the curve
    /// is resolved from the key's algorithm parameters.
    pub fn from_pkcs8_der(data: &[u8]) -> Result<Self, CmsError> {
        // We need to parse the PKCS#8 to know what kind of key we're dealing with.
        let key = Constructed::decode(data, bcder::Mode::Der, |cons| {
            OneAsymmetricKey::take_from(cons)
        })?;

        let algorithm = KeyAlgorithm::try_from(&key.private_key_algorithm)?;

        match algorithm {
            KeyAlgorithm::Rsa => Ok(Self::Rsa(ringsig::RsaKeyPair::from_pkcs8(data)?)),
            KeyAlgorithm::Ecdsa(curve) => Ok(Self::Ecdsa(
                ringsig::EcdsaKeyPair::from_pkcs8(curve.into(), data)?,
                curve,
            )),
            KeyAlgorithm::Ed25519 => Ok(Self::Ed25519(ringsig::Ed25519KeyPair::from_pkcs8(data)?)),
        }
    }

    /// Attempt to instantiate an instance from PEM encoded PKCS#8.
    ///
    /// This is a convenience wrapper for PEM decoding and calling
    /// [SigningKey::from_pkcs8_der].
    pub fn from_pkcs8_pem(data: &[u8]) -> Result<Self, CmsError> {
        let der = pem::parse(data)?;

        Self::from_pkcs8_der(&der.contents)
    }

    /// Sign a message using this signing key.
    ///
    /// Returns the raw bytes constituting the signature.
    pub fn sign(&self, message: &[u8]) -> Result<Vec<u8>, CmsError> {
        Ok(self.try_sign(message)?.into())
    }

    /// Obtain the raw bytes constituting the public key for this signing key.
    pub fn public_key(&self) -> &[u8] {
        match self {
            Self::Rsa(key) => key.public_key().as_ref(),
            Self::Ecdsa(key, _) => key.public_key().as_ref(),
            Self::Ed25519(key) => key.public_key().as_ref(),
        }
    }

    /// The algorithm of the wrapped key.
    pub fn key_algorithm(&self) -> KeyAlgorithm {
        match self {
            Self::Rsa(_) => KeyAlgorithm::Rsa,
            Self::Ecdsa(_, curve) => KeyAlgorithm::Ecdsa(*curve),
            Self::Ed25519(_) => KeyAlgorithm::Ed25519,
        }
    }
}

impl Signer<Signature> for SigningKey {
    fn try_sign(&self, msg: &[u8]) -> Result<Signature, signature::Error> {
        match self {
            Self::Rsa(key) => {
                let mut signature = vec![0; key.public_modulus_len()];

                key.sign(
                    &ringsig::RSA_PKCS1_SHA256,
                    &ring::rand::SystemRandom::new(),
                    msg,
                    &mut signature,
                )
                .map_err(|_| signature::Error::new())?;

                Ok(signature.into())
            }
            Self::Ecdsa(key, _) => {
                let signature = key
                    .sign(&ring::rand::SystemRandom::new(), msg)
                    .map_err(|_| signature::Error::new())?;

                Signature::from_bytes(signature.as_ref())
            }
            Self::Ed25519(key) => {
                let signature = key.sign(msg);

                Signature::from_bytes(signature.as_ref())
            }
        }
    }
}

impl From<&SigningKey> for SignatureAlgorithm {
    fn from(key: &SigningKey) -> Self {
        match key {
            SigningKey::Rsa(_) => SignatureAlgorithm::Sha256Rsa,
            SigningKey::Ecdsa(_, curve) => match curve {
                EcdsaCurve::Secp256r1 => SignatureAlgorithm::EcdsaSha256,
                EcdsaCurve::Secp384r1 => SignatureAlgorithm::EcdsaSha384,
            },
            SigningKey::Ed25519(_) => SignatureAlgorithm::Ed25519,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn digest_algorithm_from_str() {
        assert_eq!(
            DigestAlgorithm::from_str("SHA-256").unwrap(),
            DigestAlgorithm::Sha256
        );
        assert_eq!(
            DigestAlgorithm::from_str("sha256").unwrap(),
            DigestAlgorithm::Sha256
        );
        assert_eq!(
            DigestAlgorithm::from_str("sha-512").unwrap(),
            DigestAlgorithm::Sha512
        );
        assert_eq!(
            DigestAlgorithm::from_str("SHA-1").unwrap(),
            DigestAlgorithm::Sha1
        );
        assert!(matches!(
            DigestAlgorithm::from_str("md5"),
            Err(CmsError::UnsupportedAlgorithm(_))
        ));
    }

    #[test]
    fn digest_one_shot() {
        let output = digest(b"hello, world", "sha-256").unwrap();
        assert_eq!(output.len(), 32);
        assert_eq!(
            output,
            DigestAlgorithm::Sha256.digest_data(b"hello, world")
        );

        assert_eq!(digest(b"hello, world", "sha-384").unwrap().len(), 48);
    }

    #[test]
    fn verification_algorithm_resolution() {
        assert!(SignatureAlgorithm::Sha256Rsa
            .resolve_verification_algorithm(KeyAlgorithm::Rsa)
            .is_ok());
        assert!(SignatureAlgorithm::EcdsaSha384
            .resolve_verification_algorithm(KeyAlgorithm::Ecdsa(EcdsaCurve::Secp256r1))
            .is_ok());
        assert!(matches!(
            SignatureAlgorithm::Sha256Rsa
                .resolve_verification_algorithm(KeyAlgorithm::Ed25519),
            Err(CmsError::UnsupportedSignatureVerification(_, _))
        ));
    }

    #[test]
    fn signature_algorithm_from_bare_key_oid() {
        let rsa_oid = Oid(OID_RSA.as_ref().into());
        assert_eq!(
            SignatureAlgorithm::from_oid_and_digest_algorithm(&rsa_oid, DigestAlgorithm::Sha384)
                .unwrap(),
            SignatureAlgorithm::Sha384Rsa
        );

        let ec_oid = Oid(OID_EC_PUBLIC_KEY.as_ref().into());
        assert_eq!(
            SignatureAlgorithm::from_oid_and_digest_algorithm(&ec_oid, DigestAlgorithm::Sha256)
                .unwrap(),
            SignatureAlgorithm::EcdsaSha256
        );
        assert!(
            SignatureAlgorithm::from_oid_and_digest_algorithm(&ec_oid, DigestAlgorithm::Sha1)
                .is_err()
        );
    }

    #[test]
    fn signing_key_from_ecdsa_pkcs8() {
        let rng = ring::rand::SystemRandom::new();

        for (alg, expected_curve) in [
            (
                &ringsig::ECDSA_P256_SHA256_ASN1_SIGNING,
                EcdsaCurve::Secp256r1,
            ),
            (
                &ringsig::ECDSA_P384_SHA384_ASN1_SIGNING,
                EcdsaCurve::Secp384r1,
            ),
        ] {
            let doc = ringsig::EcdsaKeyPair::generate_pkcs8(alg, &rng).unwrap();

            let signing_key = SigningKey::from_pkcs8_der(doc.as_ref()).unwrap();
            assert!(matches!(
                signing_key,
                SigningKey::Ecdsa(_, curve) if curve == expected_curve
            ));

            let pem_data = pem::encode(&pem::Pem {
                tag: "PRIVATE KEY".to_string(),
                contents: doc.as_ref().to_vec(),
            });

            let signing_key = SigningKey::from_pkcs8_pem(pem_data.as_bytes()).unwrap();
            assert!(matches!(signing_key, SigningKey::Ecdsa(_, _)));
        }
    }

    #[test]
    fn signing_key_from_ed25519_pkcs8() {
        let rng = ring::rand::SystemRandom::new();

        let doc = ringsig::Ed25519KeyPair::generate_pkcs8(&rng).unwrap();

        let signing_key = SigningKey::from_pkcs8_der(doc.as_ref()).unwrap();
        assert!(matches!(signing_key, SigningKey::Ed25519(_)));
        assert_eq!(
            SignatureAlgorithm::from(&signing_key),
            SignatureAlgorithm::Ed25519
        );
    }

    #[test]
    fn sign_and_verify_raw_message() {
        let rng = ring::rand::SystemRandom::new();

        let doc = ringsig::EcdsaKeyPair::generate_pkcs8(
            &ringsig::ECDSA_P256_SHA256_ASN1_SIGNING,
            &rng,
        )
        .unwrap();
        let key = SigningKey::from_pkcs8_der(doc.as_ref()).unwrap();

        let message = b"hello, world";
        let signature = key.sign(message).unwrap();

        let verifier = SignatureAlgorithm::from(&key)
            .resolve_verification_algorithm(key.key_algorithm())
            .unwrap();

        ringsig::UnparsedPublicKey::new(verifier, key.public_key())
            .verify(message, &signature)
            .unwrap();
    }
}
