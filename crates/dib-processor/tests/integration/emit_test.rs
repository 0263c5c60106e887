//! End-to-end processing of a crate on disk

use crate::test_utils::create_test_crate;
use dib_domain::{BindingKey, ModuleRegistration};
use dib_processor::{Processor, ProcessorConfig, emit};
use tempfile::TempDir;

const LIB: &str = r#"
pub mod billing;

#[injectable]
#[eager_singleton]
#[derive(Default)]
pub struct Clock;
"#;

const BILLING: &str = r#"
use std::sync::Arc;

#[implemented_by(PayPal)]
pub trait Processor: Send + Sync {}

#[injectable]
pub struct PayPal {
    clock: Arc<crate::Clock>,
}

impl PayPal {
    #[inject]
    pub fn new(clock: Arc<crate::Clock>) -> Self {
        Self { clock }
    }
}
"#;

#[test]
fn test_emit_writes_artifact_and_glue() {
    let temp = TempDir::new().unwrap();
    let src = create_test_crate(&temp, "shop", &[("lib.rs", LIB), ("billing.rs", BILLING)]);
    let out = temp.path().join("out");

    let config = ProcessorConfig::new("shop", &src).with_out_dir(&out);
    let output = Processor::new(config).process().unwrap();
    let files = emit(&output, &out).unwrap();

    assert!(files.artifact.ends_with("shop.dib.json"));
    let loaded = ModuleRegistration::read_from(&files.artifact).unwrap();
    assert_eq!(loaded, output.registration);

    let clock = loaded.find(&BindingKey::new("shop::Clock")).unwrap();
    assert!(clock.eager);
    let paypal = loaded.find(&BindingKey::new("shop::billing::PayPal")).unwrap();
    assert_eq!(paypal.dependencies[0].local_target(), Some(clock.id));
    assert!(loaded.find(&BindingKey::new("shop::billing::Processor")).is_some());

    let glue = std::fs::read_to_string(&files.glue).unwrap();
    assert!(glue.contains("COMPONENT_FACTORIES"));
    assert!(glue.contains("crate :: billing :: PayPal :: new"));
    assert!(glue.contains("dyn crate :: billing :: Processor"));
}

#[test]
fn test_repeated_emit_is_byte_identical() {
    let temp = TempDir::new().unwrap();
    let src = create_test_crate(&temp, "shop", &[("lib.rs", LIB), ("billing.rs", BILLING)]);
    let out = temp.path().join("out");
    let processor = Processor::new(ProcessorConfig::new("shop", &src));

    let first = emit(&processor.process().unwrap(), &out).unwrap();
    let artifact = std::fs::read(&first.artifact).unwrap();
    let glue = std::fs::read(&first.glue).unwrap();

    let second = emit(&processor.process().unwrap(), &out).unwrap();
    assert_eq!(std::fs::read(&second.artifact).unwrap(), artifact);
    assert_eq!(std::fs::read(&second.glue).unwrap(), glue);
}

#[test]
fn test_runtime_path_from_config_file() {
    let temp = TempDir::new().unwrap();
    let src = create_test_crate(&temp, "shop", &[("lib.rs", LIB)]);
    std::fs::write(
        temp.path().join("shop").join("dib.toml"),
        "[processor]\nruntime_path = \"::dib_runtime\"\nexclude_patterns = [\"generated/**\"]\n",
    )
    .unwrap();

    let config = ProcessorConfig::new("shop", &src)
        .merge_file(&temp.path().join("shop").join("dib.toml"))
        .unwrap();
    assert_eq!(config.runtime_path, "::dib_runtime");
    assert_eq!(config.exclude_patterns, ["generated/**"]);

    let output = Processor::new(config).process().unwrap();
    let files = emit(&output, &temp.path().join("out")).unwrap();
    let glue = std::fs::read_to_string(files.glue).unwrap();
    assert!(glue.contains(":: dib_runtime :: COMPONENT_FACTORIES"));
}
