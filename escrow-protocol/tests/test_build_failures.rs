mod common;
use common::*;
use escrow_protocol::{CreateEscrowParams, EscrowError, EscrowTerms};
use solana_sdk::pubkey::Pubkey;

// TEST 1: Zero Amounts
/// Neither side of an offer may be zero
#[test]
fn test_create_rejects_zero_amounts() {
    println!("\n========== TEST: Zero Amounts ==========\n");
    let setup = setup_escrow_test();
    for (amount_a, amount_b, field) in [(0, 1, "amount_a"), (1, 0, "amount_b")] {
        let params = CreateEscrowParams {
            amount_a,
            amount_b,
            ..sample_params(&setup)
        };
        let err = setup
            .client
            .build_create_with_seed(&setup.maker, &params, 1, NOW_MS)
            .unwrap_err();
        assert!(
            matches!(err, EscrowError::InvalidParameters { field: f, .. } if f == field),
            "unexpected error {:?}",
            err
        );
    }
}

// TEST 2: Expiration Out Of Range
/// Lifetime must be between 1 and 365 days
#[test]
fn test_create_rejects_expiration_out_of_range() {
    let setup = setup_escrow_test();
    for days in [0u16, 366, u16::MAX] {
        let params = CreateEscrowParams {
            expiration_days: days,
            ..sample_params(&setup)
        };
        let result = setup
            .client
            .build_create_with_seed(&setup.maker, &params, 1, NOW_MS);
        assert!(matches!(
            result,
            Err(EscrowError::InvalidParameters {
                field: "expiration_days",
                ..
            })
        ));
    }
    for days in [1u16, 365] {
        let params = CreateEscrowParams {
            expiration_days: days,
            ..sample_params(&setup)
        };
        assert!(setup
            .client
            .build_create_with_seed(&setup.maker, &params, 1, NOW_MS)
            .is_ok());
    }
}

// TEST 3: Same Mint On Both Sides
#[test]
fn test_create_rejects_identical_mints() {
    let setup = setup_escrow_test();
    let params = CreateEscrowParams {
        token_b: setup.mint_a,
        ..sample_params(&setup)
    };
    assert!(matches!(
        setup
            .client
            .build_create_with_seed(&setup.maker, &params, 1, NOW_MS),
        Err(EscrowError::InvalidParameters { field: "token_b", .. })
    ));
}

// TEST 4: Take After Expiry
/// The cached record just expired, so no bundle is produced
#[test]
fn test_take_rejects_just_expired_escrow() {
    println!("\n========== TEST: Take Expired ==========\n");
    let setup = setup_escrow_test();
    let record = open_escrow(&setup, NOW_MS + 1_000, true);
    assert!(setup
        .client
        .build_take_at(&setup.taker, &record, NOW_MS)
        .is_ok());

    let err = setup
        .client
        .build_take_at(&setup.taker, &record, NOW_MS + 1_000)
        .unwrap_err();
    assert_eq!(
        err,
        EscrowError::EscrowNotActive {
            escrow: record.address,
            expires_at: NOW_MS + 1_000,
            now: NOW_MS + 1_000,
        }
    );
}

// TEST 5: Cancel By Non-Maker
/// Someone other than the maker tries to cancel
#[test]
fn test_cancel_by_non_maker_is_unauthorized() {
    println!("\n========== TEST: Cancel By Non-Maker ==========\n");
    let setup = setup_escrow_test();
    for (expires_at, is_mutable) in [(NOW_MS + DAY_MS, true), (NOW_MS - DAY_MS, false)] {
        let record = open_escrow(&setup, expires_at, is_mutable);
        let stranger = Pubkey::new_unique();
        let err = setup.client.build_cancel(&stranger, &record).unwrap_err();
        assert_eq!(
            err,
            EscrowError::Unauthorized {
                caller: stranger,
                maker: setup.maker,
                escrow: record.address,
            }
        );
        assert!(matches!(
            setup.client.build_cancel(&setup.taker, &record),
            Err(EscrowError::Unauthorized { .. })
        ));
    }
}

// TEST 6: Update Preconditions
#[test]
fn test_update_requires_maker_and_mutability() {
    let setup = setup_escrow_test();
    let terms = EscrowTerms {
        amount_a: 1,
        amount_b: 1,
        expiration_days: 1,
        is_mutable: true,
    };

    let mutable = open_escrow(&setup, NOW_MS + DAY_MS, true);
    assert!(matches!(
        setup
            .client
            .build_update_at(&setup.taker, &mutable, &terms, NOW_MS),
        Err(EscrowError::Unauthorized { .. })
    ));

    let frozen = open_escrow(&setup, NOW_MS + DAY_MS, false);
    assert_eq!(
        setup
            .client
            .build_update_at(&setup.maker, &frozen, &terms, NOW_MS),
        Err(EscrowError::NotMutable {
            escrow: frozen.address
        })
    );

    let zero = EscrowTerms {
        amount_b: 0,
        ..terms
    };
    assert!(matches!(
        setup
            .client
            .build_update_at(&setup.maker, &mutable, &zero, NOW_MS),
        Err(EscrowError::InvalidParameters {
            field: "amount_b",
            ..
        })
    ));
}

// TEST 7: Short Account Buffer
/// A truncated fetch never yields a partially populated record
#[test]
fn test_parse_short_account_is_malformed() {
    let setup = setup_escrow_test();
    let address = Pubkey::new_unique();
    let err = setup
        .client
        .parse_account_at(&address, &[1u8; 50], NOW_MS)
        .unwrap_err();
    match err {
        EscrowError::MalformedAccountData { address: a, reason } => {
            assert_eq!(a, address);
            assert!(reason.contains("50"));
        }
        other => panic!("expected malformed data, got {:?}", other),
    }
}
