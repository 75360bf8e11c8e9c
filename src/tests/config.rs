use crate::{
    config::{ChainConfig, GuidanceConfig, IntegratorConfig, StepScheme},
    BodyId, EngineConfig, EngineError,
};

#[test]
fn default_config_is_valid() {
    let config = EngineConfig::default();

    assert!(config.validate().is_ok());
    assert_eq!(config.cache.resolution * config.cache.multiplier, 2880);
    assert_eq!(config.chain.max_sections, 2);
    assert_eq!(config.integrator.scheme, StepScheme::KickDrift);
}

#[test]
fn invalid_values_are_rejected() {
    let broken = [
        EngineConfig {
            chain: ChainConfig {
                conic_samples: 1,
                ..Default::default()
            },
            ..Default::default()
        },
        EngineConfig {
            integrator: IntegratorConfig {
                base_step: 100.0,
                max_step: 10.0,
                ..Default::default()
            },
            ..Default::default()
        },
        EngineConfig {
            integrator: IntegratorConfig {
                max_turn: f64::NAN,
                ..Default::default()
            },
            ..Default::default()
        },
        EngineConfig {
            guidance: GuidanceConfig {
                tof_min: 10.0,
                tof_max: 1.0,
                ..Default::default()
            },
            ..Default::default()
        },
    ];

    for config in broken {
        assert!(
            matches!(config.validate(), Err(EngineError::InvalidConfig(_))),
            "{config:?} was accepted"
        );
        assert!(crate::SolarSystem::new(config).is_err());
    }
}

#[test]
fn fixed_step_config() {
    let config = IntegratorConfig::fixed_step(42.0);

    assert_eq!(config.base_step, 42.0);
    assert_eq!(config.max_step, 42.0);
    assert!(config.soi_culling);
}

#[cfg(feature = "serde")]
#[test]
fn ron_round_trip() {
    let mut config = EngineConfig::default();
    config.integrator.excluded_bodies = vec![BodyId::Earth];
    config.integrator.scheme = StepScheme::VelocityVerlet;

    let text = config.to_ron_string().expect("serialize");
    let back = EngineConfig::from_ron_str(&text).expect("parse");

    assert_eq!(back, config);
}

#[cfg(feature = "serde")]
#[test]
fn partial_ron_uses_defaults() {
    let config = EngineConfig::from_ron_str("(chain: (max_sections: 4))").expect("parse");

    assert_eq!(config.chain.max_sections, 4);
    assert_eq!(config.chain.conic_samples, ChainConfig::default().conic_samples);
    assert_eq!(config.integrator, IntegratorConfig::default());
}

#[cfg(feature = "serde")]
#[test]
fn bad_ron_is_an_error() {
    assert!(matches!(
        EngineConfig::from_ron_str("(chain: (max_sections: \"many\"))"),
        Err(EngineError::ConfigParse(_))
    ));
    assert!(matches!(
        EngineConfig::from_ron_str("(chain: (max_sections: 0))"),
        Err(EngineError::InvalidConfig(_))
    ));
    assert!(matches!(
        EngineConfig::load(std::path::Path::new("/nonexistent/engine.ron")),
        Err(EngineError::ConfigRead(_))
    ));
}

#[test]
fn body_ids_are_named() {
    assert_eq!(BodyId::ALL.len(), 9);
    assert_eq!(BodyId::Earth.to_string(), "Earth");
    assert_eq!(BodyId::Sun.name(), "Sun");
}
