//! Proptest strategies shared by the unit tests.

use crate::{Algorithm, Capability, Timestamp, TokenBuilder};
use proptest::{collection, option, prelude::*};
use serde_json::Value;

pub(crate) fn algorithm() -> impl Strategy<Value = Algorithm> {
    prop_oneof![
        Just(Algorithm::EdDSA),
        Just(Algorithm::ES256),
        Just(Algorithm::RS256),
    ]
}

/// URL-shaped resources over a small alphabet, so containment cases occur.
pub(crate) fn resource() -> impl Strategy<Value = String> {
    "(storage|https)://[a-c]{1,3}\\.example(/[a-c0-9]{1,4}){0,3}"
}

/// Actions without wildcards: `verb` or `namespace/verb`.
pub(crate) fn concrete_action() -> impl Strategy<Value = String> {
    "[a-e]{1,4}(/[a-e]{1,4})?"
}

pub(crate) fn action() -> impl Strategy<Value = String> {
    prop_oneof![
        4 => concrete_action(),
        1 => Just("*".to_owned()),
        1 => "[a-e]{1,4}/\\*",
    ]
}

/// JSON values without floats, nested two levels deep.
pub(crate) fn caveat_value() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::from),
        any::<i64>().prop_map(Value::from),
        "[a-z ]{0,8}".prop_map(Value::from),
    ];
    leaf.prop_recursive(2, 12, 4, |inner| {
        prop_oneof![
            collection::vec(inner.clone(), 0..4).prop_map(Value::from),
            collection::btree_map("[a-z]{1,4}", inner, 0..4)
                .prop_map(|map| Value::Object(map.into_iter().collect())),
        ]
    })
}

pub(crate) fn capability() -> impl Strategy<Value = Capability> {
    (
        resource(),
        action(),
        collection::btree_map("[a-z_]{1,6}", caveat_value(), 0..4),
    )
        .prop_map(|(resource, action, caveats)| {
            caveats
                .into_iter()
                .fold(Capability::new(resource, action), |capability, (key, value)| {
                    capability.clone().caveat(key, value).unwrap_or(capability)
                })
        })
}

/// Complete builders: issuer and audience are always set.
pub(crate) fn token_builder() -> impl Strategy<Value = TokenBuilder> {
    (
        (
            algorithm(),
            "did:example:[a-z0-9]{1,12}",
            "did:example:[a-z0-9]{1,12}",
            option::of(any::<u32>()),
            option::of(any::<u32>()),
            option::of("[A-Za-z0-9]{1,16}"),
        ),
        collection::btree_map("[a-z]{1,6}", "[a-z ]{0,12}", 0..3),
        collection::vec(capability(), 0..4),
        collection::vec("[A-Za-z0-9_.-]{1,32}", 0..3),
    )
        .prop_map(
            |((algorithm, issuer, audience, expiration, not_before, nonce), facts, capabilities, proofs)| {
                let mut builder = TokenBuilder::new()
                    .algorithm(algorithm)
                    .issuer(issuer)
                    .audience(audience)
                    .expiration(expiration.map(|exp| Timestamp::from_unix(exp.into())))
                    .capabilities(capabilities);
                if let Some(not_before) = not_before {
                    builder = builder.not_before(Timestamp::from_unix(not_before.into()));
                }
                if let Some(nonce) = nonce {
                    builder = builder.nonce(nonce);
                }
                for (key, value) in facts {
                    builder = builder.fact(key, value);
                }
                for proof in proofs {
                    builder = builder.proof(proof);
                }
                builder
            },
        )
}
