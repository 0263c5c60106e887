//! Processing diagnostics
//!
//! Every problem found in the annotated sources is reported as a
//! [`ProcessorDiagnostic`]. All error-level diagnostics abort processing; the
//! full list is returned so one build shows every wiring mistake at once.

use dib_domain::SourceLocation;
use serde::Serialize;
use std::fmt::{self, Display};

/// Diagnostic severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Severity {
    /// Processing fails
    Error,
    /// Reported, processing continues
    Warning,
}

impl Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warning => write!(f, "warning"),
        }
    }
}

/// Common interface of processing diagnostics
pub trait Diagnostic: Display {
    /// Stable identifier (e.g. "DIB001")
    fn id(&self) -> &'static str;

    /// Severity level
    fn severity(&self) -> Severity;

    /// Type the diagnostic is about
    fn type_name(&self) -> &str;

    /// Declaration site, when known
    fn location(&self) -> Option<&SourceLocation>;

    /// Suggested fix
    fn suggestion(&self) -> Option<String> {
        None
    }
}

/// A problem found while processing annotated sources
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ProcessorDiagnostic {
    /// More than one constructor qualifies as construction point
    MultipleConstructionPoints {
        type_name: String,
        candidates: Vec<String>,
        location: SourceLocation,
    },
    /// No constructor, `Default` derive or unit shape
    NoConstructionPoint {
        type_name: String,
        location: SourceLocation,
    },
    /// Dependencies form a cycle inside the registration
    CyclicDependency {
        cycle: Vec<String>,
        location: SourceLocation,
    },
    /// A written dependency matches several different bindings
    AmbiguousDependency {
        type_name: String,
        dependency: String,
        candidates: Vec<String>,
        location: SourceLocation,
    },
    /// Two declarations bind the same key in overlapping environments
    DuplicateBinding {
        type_name: String,
        first: SourceLocation,
        location: SourceLocation,
    },
    /// Scope kind outside singleton/request/prototype
    UnsupportedScope {
        type_name: String,
        scope: String,
        location: SourceLocation,
    },
    /// Marker arguments are malformed or markers contradict each other
    InvalidMarker {
        type_name: String,
        marker: String,
        message: String,
        location: SourceLocation,
    },
    /// `#[provides]` method is not `pub`
    ProvidesNotPublic {
        type_name: String,
        method: String,
        location: SourceLocation,
    },
    /// `#[provides]` method returns nothing
    ProvidesReturnsUnit {
        type_name: String,
        method: String,
        location: SourceLocation,
    },
    /// `#[provides]` method outside a `#[module]` impl
    ProvidesOutsideModule {
        type_name: String,
        method: String,
        location: SourceLocation,
    },
    /// Receiver other than `&self`
    UnsupportedReceiver {
        type_name: String,
        method: String,
        location: SourceLocation,
    },
    /// Parameter type cannot be injected
    UnsupportedParameter {
        type_name: String,
        parameter: String,
        location: SourceLocation,
    },
    /// `#[implemented_by]` target is not an injectable type of this crate
    UnresolvedImplementation {
        type_name: String,
        target: String,
        location: SourceLocation,
    },
    /// File does not parse
    Parse { file: String, message: String },
    /// Chosen constructor is not reachable from the crate root
    ConstructorNotPublic {
        type_name: String,
        method: String,
        location: SourceLocation,
    },
}

impl ProcessorDiagnostic {
    /// Convert the wiring diagnostics to the shared domain error
    pub fn to_domain_error(&self) -> Option<dib_domain::Error> {
        match self {
            Self::MultipleConstructionPoints {
                type_name,
                candidates,
                ..
            } => Some(dib_domain::Error::multiple_construction_points(
                type_name.clone(),
                candidates.clone(),
            )),
            Self::CyclicDependency { cycle, .. } => {
                Some(dib_domain::Error::cyclic_dependency(cycle.clone()))
            }
            _ => None,
        }
    }

    /// True for error-level diagnostics
    pub fn is_error(&self) -> bool {
        self.severity() == Severity::Error
    }
}

impl Display for ProcessorDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MultipleConstructionPoints {
                type_name,
                candidates,
                ..
            } => write!(
                f,
                "{type_name} has multiple construction points: {}",
                candidates.join(", ")
            ),
            Self::NoConstructionPoint { type_name, .. } => {
                write!(f, "{type_name} has no construction point")
            }
            Self::CyclicDependency { cycle, .. } => {
                write!(f, "Cyclic dependency: {}", cycle.join(" -> "))
            }
            Self::AmbiguousDependency {
                type_name,
                dependency,
                candidates,
                ..
            } => write!(
                f,
                "{type_name} depends on {dependency}, which matches {}",
                candidates.join(", ")
            ),
            Self::DuplicateBinding {
                type_name, first, ..
            } => write!(f, "{type_name} is already bound at {first}"),
            Self::UnsupportedScope {
                type_name, scope, ..
            } => write!(f, "{type_name} uses unsupported scope '{scope}'"),
            Self::InvalidMarker {
                type_name,
                marker,
                message,
                ..
            } => write!(f, "{type_name}: invalid {marker}: {message}"),
            Self::ProvidesNotPublic {
                type_name, method, ..
            } => write!(f, "{type_name}::{method} is #[provides] but not pub"),
            Self::ProvidesReturnsUnit {
                type_name, method, ..
            } => write!(f, "{type_name}::{method} is #[provides] but returns ()"),
            Self::ProvidesOutsideModule {
                type_name, method, ..
            } => write!(
                f,
                "{type_name}::{method} is #[provides] outside a #[module] impl and is ignored"
            ),
            Self::UnsupportedReceiver {
                type_name, method, ..
            } => write!(f, "{type_name}::{method} must take &self or no receiver"),
            Self::UnsupportedParameter {
                type_name,
                parameter,
                ..
            } => write!(f, "{type_name}: parameter `{parameter}` cannot be injected"),
            Self::UnresolvedImplementation {
                type_name, target, ..
            } => write!(
                f,
                "{type_name} is implemented by {target}, which is not an injectable type of this crate"
            ),
            Self::Parse { file, message } => write!(f, "{file}: {message}"),
            Self::ConstructorNotPublic {
                type_name, method, ..
            } => write!(f, "{type_name}::{method} is the construction point but not pub"),
        }
    }
}

impl Diagnostic for ProcessorDiagnostic {
    fn id(&self) -> &'static str {
        match self {
            Self::MultipleConstructionPoints { .. } => "DIB001",
            Self::CyclicDependency { .. } => "DIB002",
            Self::NoConstructionPoint { .. } => "DIB003",
            Self::AmbiguousDependency { .. } => "DIB004",
            Self::DuplicateBinding { .. } => "DIB005",
            Self::UnsupportedScope { .. } => "DIB006",
            Self::InvalidMarker { .. } => "DIB007",
            Self::ProvidesNotPublic { .. } => "DIB008",
            Self::ProvidesReturnsUnit { .. } => "DIB009",
            Self::ProvidesOutsideModule { .. } => "DIB010",
            Self::UnsupportedReceiver { .. } => "DIB011",
            Self::UnsupportedParameter { .. } => "DIB012",
            Self::UnresolvedImplementation { .. } => "DIB013",
            Self::Parse { .. } => "DIB014",
            Self::ConstructorNotPublic { .. } => "DIB015",
        }
    }

    fn severity(&self) -> Severity {
        match self {
            Self::ProvidesOutsideModule { .. } => Severity::Warning,
            _ => Severity::Error,
        }
    }

    fn type_name(&self) -> &str {
        match self {
            Self::MultipleConstructionPoints { type_name, .. }
            | Self::NoConstructionPoint { type_name, .. }
            | Self::AmbiguousDependency { type_name, .. }
            | Self::DuplicateBinding { type_name, .. }
            | Self::UnsupportedScope { type_name, .. }
            | Self::InvalidMarker { type_name, .. }
            | Self::ProvidesNotPublic { type_name, .. }
            | Self::ProvidesReturnsUnit { type_name, .. }
            | Self::ProvidesOutsideModule { type_name, .. }
            | Self::UnsupportedReceiver { type_name, .. }
            | Self::UnsupportedParameter { type_name, .. }
            | Self::UnresolvedImplementation { type_name, .. }
            | Self::ConstructorNotPublic { type_name, .. } => type_name,
            Self::CyclicDependency { cycle, .. } => cycle.first().map_or("", String::as_str),
            Self::Parse { file, .. } => file,
        }
    }

    fn location(&self) -> Option<&SourceLocation> {
        match self {
            Self::MultipleConstructionPoints { location, .. }
            | Self::NoConstructionPoint { location, .. }
            | Self::CyclicDependency { location, .. }
            | Self::AmbiguousDependency { location, .. }
            | Self::DuplicateBinding { location, .. }
            | Self::UnsupportedScope { location, .. }
            | Self::InvalidMarker { location, .. }
            | Self::ProvidesNotPublic { location, .. }
            | Self::ProvidesReturnsUnit { location, .. }
            | Self::ProvidesOutsideModule { location, .. }
            | Self::UnsupportedReceiver { location, .. }
            | Self::UnsupportedParameter { location, .. }
            | Self::UnresolvedImplementation { location, .. }
            | Self::ConstructorNotPublic { location, .. } => Some(location),
            Self::Parse { .. } => None,
        }
    }

    fn suggestion(&self) -> Option<String> {
        match self {
            Self::MultipleConstructionPoints { .. } => {
                Some("Mark exactly one constructor with #[inject]".to_string())
            }
            Self::NoConstructionPoint { .. } => Some(
                "Add a pub constructor returning Self, or derive Default".to_string(),
            ),
            Self::AmbiguousDependency { .. } => {
                Some("Write the dependency with its full module path".to_string())
            }
            Self::UnsupportedParameter { .. } => Some(
                "Take dependencies as Arc<T>, Arc<dyn Trait>, an owned value or Lazy<..> of one"
                    .to_string(),
            ),
            Self::ConstructorNotPublic { .. } => {
                Some("Make the constructor pub or pub(crate)".to_string())
            }
            _ => None,
        }
    }
}

/// Render diagnostics one per line, with location and id
pub fn render_all(diagnostics: &[ProcessorDiagnostic]) -> String {
    diagnostics
        .iter()
        .map(render)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Render one diagnostic as `severity[ID] location: message`
pub fn render(diagnostic: &ProcessorDiagnostic) -> String {
    let mut line = match diagnostic.location() {
        Some(location) => format!(
            "{}[{}] {}: {}",
            diagnostic.severity(),
            diagnostic.id(),
            location,
            diagnostic
        ),
        None => format!("{}[{}] {}", diagnostic.severity(), diagnostic.id(), diagnostic),
    };
    if let Some(hint) = diagnostic.suggestion() {
        line.push_str(&format!(" (hint: {hint})"));
    }
    line
}
