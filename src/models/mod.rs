pub mod content;
pub mod identity;
pub mod result;
pub mod session;

pub use content::{Artifact, ArtifactKind, ContentItem, ContentKind, ImageExt, PersistOutcome, RawContent};
pub use identity::PageIdentity;
pub use result::{Incident, IncidentKind, SessionResult, TerminationReason};
pub use session::{sanitize_component, Anchor, Session, SessionKey};
