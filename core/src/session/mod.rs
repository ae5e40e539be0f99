pub mod machine;
pub mod state;
pub mod view;

pub use machine::{apply, Action, ActionContext, ActionOutcome, Notice, NoticeLevel};
pub use state::{Phase, SessionState};
pub use view::{render, AssetCatalog, DashboardView, RenderContext};
