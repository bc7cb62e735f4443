//! Property tests for signing and the canonical encoding.

mod common;

use chrono::{DateTime, Utc};
use clusterlicense::codec::{decode, encode};
use clusterlicense::license::{LicenseDraft, SELF_ISSUER};
use clusterlicense::{License, LicenseSigner, LicenseType, LicenseVerifier};
use proptest::prelude::*;

fn signer() -> LicenseSigner {
    LicenseSigner::from_hex(common::SELF_SEED_HEX).unwrap()
}

fn verifier() -> LicenseVerifier {
    LicenseVerifier::new(signer().verifying_key(), common::issuer().verifying_key())
}

fn license_type() -> impl Strategy<Value = LicenseType> {
    prop_oneof![
        Just(LicenseType::Basic),
        Just(LicenseType::Trial),
        Just(LicenseType::Standard),
        Just(LicenseType::Gold),
        Just(LicenseType::Platinum),
    ]
}

prop_compose! {
    fn arb_license()(
        uid in "[a-z0-9-]{1,24}",
        license_type in license_type(),
        issue_ms in 0i64..4_102_444_800_000,
        lifetime_ms in 0i64..(10 * 365 * 24 * 3_600_000),
        issued_to in "\\PC{0,32}",
        self_issued in any::<bool>(),
        max_nodes in any::<u32>(),
    ) -> License {
        let issue_date = DateTime::<Utc>::from_timestamp_millis(issue_ms).unwrap();
        let expiry_date =
            DateTime::<Utc>::from_timestamp_millis(issue_ms + lifetime_ms).unwrap();
        LicenseDraft {
            uid,
            license_type,
            issue_date,
            expiry_date,
            issued_to,
            issuer: if self_issued { SELF_ISSUER.to_string() } else { "issuer-authority".to_string() },
            max_nodes,
        }
        .build()
    }
}

fn sign(license: License) -> License {
    if license.is_self_issued() {
        signer().sign_license(license)
    } else {
        common::issuer().sign_license(license)
    }
}

proptest! {
    #[test]
    fn signed_licenses_verify(license in arb_license()) {
        prop_assert!(verifier().verify(&sign(license)));
    }

    #[test]
    fn encoding_decodes_to_the_same_fields(license in arb_license()) {
        prop_assert_eq!(decode(&encode(&license)).unwrap(), license);
    }

    #[test]
    fn any_single_bit_flip_breaks_verification(license in arb_license(), bit in any::<usize>()) {
        let signed = sign(license);
        let mut bytes = encode(&signed);
        let bit = bit % (bytes.len() * 8);
        bytes[bit / 8] ^= 1 << (bit % 8);

        // Mutations either fail to decode or no longer match the signature.
        if let Ok(mutated) = decode(&bytes) {
            let mutated = mutated.with_signature(signed.signature().to_vec());
            prop_assert!(!verifier().verify(&mutated));
        }
    }

    #[test]
    fn flipped_signature_bit_breaks_verification(license in arb_license(), bit in 0usize..512) {
        let signed = sign(license);
        let mut signature = signed.signature().to_vec();
        signature[bit / 8] ^= 1 << (bit % 8);
        prop_assert!(!verifier().verify(&signed.with_signature(signature)));
    }
}
