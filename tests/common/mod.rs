//! Shared fixtures for integration tests.

use async_trait::async_trait;
use std::sync::{Arc, Mutex, Once};
use trellis::{
    Context, Directory, Handler, HandlerResult, Member, Role, RoleId, UserId, Value,
};

static LOG_INIT: Once = Once::new();

/// Install the log subscriber once per test binary; filter with `RUST_LOG`.
pub fn init_logging() {
    LOG_INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Directory with a fixed cast of members and roles.
pub struct TestDirectory;

impl Directory for TestDirectory {
    fn member(&self, id: UserId) -> Option<Member> {
        match id.0 {
            100 => Some(Member { id, display_name: "alice".into() }),
            101 => Some(Member { id, display_name: "bob".into() }),
            _ => None,
        }
    }

    fn role(&self, id: RoleId) -> Option<Role> {
        match id.0 {
            9 => Some(Role { id, name: "moderators".into() }),
            _ => None,
        }
    }
}

/// Records every argument vector it is invoked with.
#[derive(Default)]
pub struct Recorder {
    calls: Mutex<Vec<Vec<Value>>>,
}

impl Recorder {
    pub fn calls(&self) -> Vec<Vec<Value>> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

pub struct RecordingHandler(pub Arc<Recorder>);

#[async_trait]
impl Handler for RecordingHandler {
    async fn run(&self, _ctx: &Context<'_>, args: Vec<Value>) -> HandlerResult {
        self.0.calls.lock().unwrap().push(args);
        Ok(())
    }
}

/// Convenience: a fresh recorder plus a handler feeding it.
pub fn recorder() -> (Arc<Recorder>, Arc<dyn Handler>) {
    let rec = Arc::new(Recorder::default());
    let handler: Arc<dyn Handler> = Arc::new(RecordingHandler(Arc::clone(&rec)));
    (rec, handler)
}

/// Recorders behind the moderation-bot engine built by the flow tests.
pub struct Fixture {
    pub root_rec: Arc<Recorder>,
    pub warn_rec: Arc<Recorder>,
    pub warn_clear_rec: Arc<Recorder>,
}
