//! Tests for diagnostic rendering

use dib_domain::SourceLocation;
use dib_processor::diagnostics::render;
use dib_processor::{Diagnostic, ProcessorDiagnostic, Severity};

fn at(line: usize) -> SourceLocation {
    SourceLocation {
        file: "billing.rs".into(),
        line,
    }
}

#[test]
fn test_render_includes_id_location_and_hint() {
    let diagnostic = ProcessorDiagnostic::MultipleConstructionPoints {
        type_name: "app::billing::Ledger".into(),
        candidates: vec!["new".into(), "open".into()],
        location: at(12),
    };
    assert_eq!(
        render(&diagnostic),
        "error[DIB001] billing.rs:12: app::billing::Ledger has multiple construction points: new, open \
         (hint: Mark exactly one constructor with #[inject])"
    );
}

#[test]
fn test_only_stray_provides_is_a_warning() {
    let warning = ProcessorDiagnostic::ProvidesOutsideModule {
        type_name: "app::Helper".into(),
        method: "value".into(),
        location: at(3),
    };
    assert_eq!(warning.severity(), Severity::Warning);
    assert!(!warning.is_error());
    assert!(warning.to_domain_error().is_none());

    let parse = ProcessorDiagnostic::Parse {
        file: "lib.rs".into(),
        message: "expected ident".into(),
    };
    assert_eq!(parse.severity(), Severity::Error);
    assert!(parse.location().is_none());
    assert_eq!(parse.type_name(), "lib.rs");
}

#[test]
fn test_cycle_converts_to_domain_error() {
    let diagnostic = ProcessorDiagnostic::CyclicDependency {
        cycle: vec!["app::A".into(), "app::B".into(), "app::A".into()],
        location: at(1),
    };
    let err = diagnostic.to_domain_error().unwrap();
    assert!(err.is_wiring_error());
    assert_eq!(diagnostic.type_name(), "app::A");
}

#[test]
fn test_constructor_not_public_hint() {
    let diagnostic = ProcessorDiagnostic::ConstructorNotPublic {
        type_name: "app::inner::Foo".into(),
        method: "make".into(),
        location: at(4),
    };
    assert_eq!(diagnostic.id(), "DIB015");
    assert_eq!(
        render(&diagnostic),
        "error[DIB015] billing.rs:4: app::inner::Foo::make is the construction point but not pub \
         (hint: Make the constructor pub or pub(crate))"
    );
}
