//! Property-based tests for configuration validation

use super::error::ValidationError;
use super::validator::validate_config;
use crate::config::schema::*;
use crate::synth::StageConfig;
use proptest::prelude::*;

fn arb_valid_spec() -> impl Strategy<Value = StackSpec> {
    (
        0.0f64..0.99,    // test_ratio
        1usize..100,     // epochs
        1usize..4096,    // batch_size
        0.0f32..2.0,     // noise_scale
        0.01f64..10.0,   // smoothing
        any::<Option<u64>>(),
    )
        .prop_map(|(test_ratio, epochs, batch_size, noise_scale, smoothing, seed)| StackSpec {
            data: DataSpec {
                test_ratio,
                categorical_columns: vec!["a".to_string()],
                ..Default::default()
            },
            training: StageConfig { epochs, batch_size, noise_scale, smoothing, seed },
            output: OutputSpec::default(),
        })
}

proptest! {
    #[test]
    fn prop_valid_specs_pass(spec in arb_valid_spec()) {
        prop_assert!(validate_config(&spec).is_ok());
    }

    #[test]
    fn prop_ratio_at_or_above_one_fails(spec in arb_valid_spec(), ratio in 1.0f64..100.0) {
        let mut spec = spec;
        spec.data.test_ratio = ratio;
        prop_assert!(matches!(validate_config(&spec), Err(ValidationError::InvalidTestRatio(_))));
    }

    #[test]
    fn prop_yaml_roundtrip_stays_valid(spec in arb_valid_spec()) {
        let yaml = serde_yaml::to_string(&spec).unwrap();
        let back: StackSpec = serde_yaml::from_str(&yaml).unwrap();
        prop_assert_eq!(&back.training, &spec.training);
        prop_assert!(validate_config(&back).is_ok());
    }
}
