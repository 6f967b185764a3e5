//! Session controller
//!
//! A [`Session`] owns the loaded module and everything the console shows
//! about it. Every operation goes through here so the call order on the module
//! is always allocate, write, invoke, read, clear, release.
//!
//! ```text
//! Uninitialized -> Loading -> Ready -> (Evaluating -> Ready)* -> Resetting -> Ready
//!                     |
//!                     +-> Failed (terminal)
//! ```

use super::driver::{self, EvalStatus, Evaluation};
use super::history::History;
use super::lamps::Peripherals;
use super::stack_view::StackView;
use crate::error::{ConsoleError, ModuleLoadError};
use crate::module::{HostImports, ModuleLoader, VmModule};
use crate::snapshot::{LineKind, Transcript};
use std::fmt;
use std::path::PathBuf;
use std::rc::Rc;

/// Dictionary capacity passed to `init`
pub const INIT_DICT_CELLS: i32 = 20000;

/// Stack capacity passed to `init`
pub const INIT_STACK_CELLS: i32 = 256;

pub const STATUS_READY: &str = "Ready";
pub const STATUS_IDLE: &str = " ";
pub const STATUS_RESET: &str = "VM reset";
pub const STATUS_LOAD_FAILED: &str = "Failed to load VM module";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Uninitialized,
    Loading,
    Ready,
    Evaluating,
    Resetting,
    Failed,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Uninitialized => "uninitialized",
            SessionState::Loading => "loading",
            SessionState::Ready => "ready",
            SessionState::Evaluating => "evaluating",
            SessionState::Resetting => "resetting",
            SessionState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Parameters for bringing a module up
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub dict_cells: i32,
    pub stack_cells: i32,
    /// Source evaluated line by line after `init`
    pub prelude: Option<PathBuf>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            dict_cells: INIT_DICT_CELLS,
            stack_cells: INIT_STACK_CELLS,
            prelude: None,
        }
    }
}

pub struct Session {
    module: Option<Box<dyn VmModule>>,
    peripherals: Rc<Peripherals>,
    state: SessionState,
    history: History,
    stack: StackView,
    transcript: Transcript,
    status: String,
    last_status: Option<EvalStatus>,
}

impl Session {
    pub fn new(peripherals: Rc<Peripherals>) -> Self {
        Session {
            module: None,
            peripherals,
            state: SessionState::Uninitialized,
            history: History::new(),
            stack: StackView::default(),
            transcript: Transcript::new(),
            status: String::new(),
            last_status: None,
        }
    }

    /// Load and initialize the module.
    ///
    /// A failure is terminal: the session moves to [`SessionState::Failed`],
    /// the error text goes to the transcript and every later operation
    /// returns [`ConsoleError::NotLoaded`].
    pub fn start(
        &mut self,
        loader: &dyn ModuleLoader,
        config: &SessionConfig,
    ) -> Result<(), ModuleLoadError> {
        if self.state != SessionState::Uninitialized {
            log::warn!("session already started ({})", self.state);
            return Ok(());
        }

        self.state = SessionState::Loading;
        self.status = "Loading VM module...".to_string();
        log::info!(
            "loading VM module (dict_cells={}, stack_cells={})",
            config.dict_cells,
            config.stack_cells
        );

        match self.bring_up(loader, config) {
            Ok(()) => {
                self.state = SessionState::Ready;
                self.status = STATUS_READY.to_string();
                log::info!("session ready");
                Ok(())
            }
            Err(err) => {
                log::error!("{}: {}", STATUS_LOAD_FAILED, err);
                self.module = None;
                self.state = SessionState::Failed;
                self.status = STATUS_LOAD_FAILED.to_string();
                self.transcript.notice(&err.to_string());
                Err(err)
            }
        }
    }

    fn bring_up(
        &mut self,
        loader: &dyn ModuleLoader,
        config: &SessionConfig,
    ) -> Result<(), ModuleLoadError> {
        let prelude = match &config.prelude {
            Some(path) => Some(std::fs::read_to_string(path).map_err(|source| {
                ModuleLoadError::Prelude {
                    path: path.display().to_string(),
                    source,
                }
            })?),
            None => None,
        };

        let host: Rc<dyn HostImports> = self.peripherals.clone();
        let mut module = loader.load(host)?;

        let code = module.init(config.dict_cells, config.stack_cells);
        if code != 0 {
            return Err(ModuleLoadError::Init(code));
        }
        let banner = driver::drain_output(module.as_mut());
        self.transcript.print(&banner, LineKind::Output);

        if let Some(source) = prelude {
            let mut count = 0;
            for line in source.lines() {
                let eval = driver::evaluate(module.as_mut(), line)?;
                self.transcript.print(&eval.output, LineKind::Output);
                if eval.status.is_some() {
                    count += 1;
                }
            }
            log::debug!("prelude evaluated {} lines", count);
        }

        self.stack.refresh(module.as_mut())?;
        self.module = Some(module);
        Ok(())
    }

    /// Evaluate one line typed by the user.
    ///
    /// Blank lines do nothing and return `Ok(None)`. On an allocation failure
    /// the line is neither echoed nor recorded and the status line says why.
    /// Once the line has run, its evaluation is returned even if the stack
    /// view could not be refreshed; only the status line reports that.
    pub fn submit(&mut self, line: &str) -> Result<Option<Evaluation>, ConsoleError> {
        let Some(module) = self.module.as_mut() else {
            return Err(ConsoleError::NotLoaded);
        };
        if line.trim().is_empty() {
            return Ok(None);
        }

        self.state = SessionState::Evaluating;
        let result = driver::evaluate(module.as_mut(), line);
        self.state = SessionState::Ready;

        let eval = match result {
            Ok(eval) => eval,
            Err(err) => {
                self.status = format!("Input not evaluated: {}", err);
                return Err(err.into());
            }
        };

        self.history.submit(line);
        self.transcript.echo_input(line);
        self.transcript.print(&eval.output, LineKind::Output);
        self.last_status = eval.status;

        match self.stack.refresh(module.as_mut()) {
            Ok(()) => self.status = STATUS_IDLE.to_string(),
            Err(err) => {
                log::warn!("stack view kept stale: {}", err);
                self.status = format!("Stack not refreshed: {}", err);
            }
        }
        Ok(Some(eval))
    }

    /// Return the module to its post-init state.
    ///
    /// History and transcript are kept.
    pub fn reset(&mut self) -> Result<(), ConsoleError> {
        let Some(module) = self.module.as_mut() else {
            return Err(ConsoleError::NotLoaded);
        };

        self.state = SessionState::Resetting;
        module.reset();
        module.clear_output();
        let refreshed = self.stack.refresh(module.as_mut());
        self.state = SessionState::Ready;
        self.last_status = None;

        match refreshed {
            Ok(()) => {
                log::info!("VM reset");
                self.status = STATUS_RESET.to_string();
                Ok(())
            }
            Err(err) => {
                self.status = format!("Stack not refreshed: {}", err);
                Err(err.into())
            }
        }
    }

    pub fn clear_transcript(&mut self) {
        self.transcript.clear();
    }

    pub fn recall_previous(&mut self) -> Option<String> {
        self.history.recall_previous().map(str::to_string)
    }

    pub fn recall_next(&mut self) -> Option<String> {
        self.history.recall_next().map(str::to_string)
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_loaded(&self) -> bool {
        self.module.is_some()
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    /// Return code of the most recent evaluation
    pub fn last_status(&self) -> Option<EvalStatus> {
        self.last_status
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn stack(&self) -> &StackView {
        &self.stack
    }

    pub fn stack_mut(&mut self) -> &mut StackView {
        &mut self.stack
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn peripherals(&self) -> &Peripherals {
        &self.peripherals
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::testing::{FailingLoader, ScriptedLoader};
    use crate::module::status;

    fn started(loader: &ScriptedLoader) -> Session {
        let mut session = Session::new(Rc::new(Peripherals::default()));
        session.start(loader, &SessionConfig::default()).unwrap();
        session
    }

    #[test]
    fn test_start_drains_banner_and_refreshes_stack() {
        let session = started(&ScriptedLoader::default());
        assert_eq!(session.state(), SessionState::Ready);
        assert_eq!(session.status(), STATUS_READY);
        assert_eq!(session.transcript().get_output(), vec!["scripted"]);
        assert_eq!(session.stack().text(), "n = 0");
    }

    #[test]
    fn test_load_failure_is_terminal() {
        let mut session = Session::new(Rc::new(Peripherals::default()));
        let err = session
            .start(&FailingLoader, &SessionConfig::default())
            .unwrap_err();
        assert!(matches!(err, ModuleLoadError::MemoryTooSmall { .. }));
        assert_eq!(session.state(), SessionState::Failed);
        assert_eq!(session.status(), STATUS_LOAD_FAILED);
        assert_eq!(session.transcript().get_output(), vec![err.to_string()]);

        assert!(matches!(session.submit("1"), Err(ConsoleError::NotLoaded)));
        assert!(matches!(session.reset(), Err(ConsoleError::NotLoaded)));
    }

    #[test]
    fn test_nonzero_init_code_fails_load() {
        let loader = ScriptedLoader {
            init_code: -1,
            ..ScriptedLoader::default()
        };
        let mut session = Session::new(Rc::new(Peripherals::default()));
        let err = session.start(&loader, &SessionConfig::default()).unwrap_err();
        assert!(matches!(err, ModuleLoadError::Init(-1)));
        assert!(!session.is_loaded());
    }

    #[test]
    fn test_submit_echoes_records_and_clears_status() {
        let mut session = started(&ScriptedLoader::default());
        let eval = session.submit("hello").unwrap().unwrap();
        assert_eq!(eval.output, "hello");
        assert_eq!(session.status(), STATUS_IDLE);
        assert_eq!(session.history().entries(), &["hello".to_string()]);
        assert_eq!(
            session.transcript().get_output(),
            vec!["scripted", "hello", "hello"]
        );
        assert_eq!(session.last_status(), Some(EvalStatus::Completed));
    }

    #[test]
    fn test_blank_submit_changes_nothing() {
        let mut session = started(&ScriptedLoader::default());
        let before = session.transcript().get_output();
        assert!(session.submit("   ").unwrap().is_none());
        assert!(session.history().is_empty());
        assert_eq!(session.transcript().get_output(), before);
        assert_eq!(session.status(), STATUS_READY);
    }

    #[test]
    fn test_failed_code_is_kept_as_last_status() {
        let loader = ScriptedLoader {
            eval_code: status::ERROR_EXIT,
            ..ScriptedLoader::default()
        };
        let mut session = started(&loader);
        session.submit("bogus").unwrap();
        assert_eq!(
            session.last_status(),
            Some(EvalStatus::Failed(status::ERROR_EXIT))
        );
        assert_eq!(session.state(), SessionState::Ready);
    }

    #[test]
    fn test_allocation_failure_leaves_session_usable() {
        let loader = ScriptedLoader {
            scratch: 300,
            ..ScriptedLoader::default()
        };
        let mut session = started(&loader);
        let long = "x".repeat(400);
        assert!(matches!(
            session.submit(&long),
            Err(ConsoleError::Allocation(_))
        ));
        assert!(session.history().is_empty());
        assert!(session.status().starts_with("Input not evaluated"));

        session.submit("short").unwrap();
        assert_eq!(session.history().len(), 1);
    }

    #[test]
    fn test_stale_stack_still_returns_evaluation() {
        let loader = ScriptedLoader {
            starve_after_eval: true,
            ..ScriptedLoader::default()
        };
        let mut session = started(&loader);
        let eval = session.submit("once").unwrap().unwrap();
        assert_eq!(eval.output, "once");
        assert_eq!(session.history().len(), 1);
        assert!(session.status().starts_with("Stack not refreshed"));
        assert_eq!(session.stack().text(), "n = 0");
        assert_eq!(session.state(), SessionState::Ready);
    }

    #[test]
    fn test_reset_keeps_history_and_transcript() {
        let mut session = started(&ScriptedLoader::default());
        session.submit("one").unwrap();
        let transcript = session.transcript().get_output();

        session.reset().unwrap();
        assert_eq!(session.status(), STATUS_RESET);
        assert_eq!(session.history().len(), 1);
        assert_eq!(session.transcript().get_output(), transcript);
        assert_eq!(session.stack().text(), "n = 0");
    }

    #[test]
    fn test_recall_goes_through_history() {
        let mut session = started(&ScriptedLoader::default());
        session.submit("a").unwrap();
        session.submit("b").unwrap();
        assert_eq!(session.recall_previous().as_deref(), Some("b"));
        assert_eq!(session.recall_previous().as_deref(), Some("a"));
        assert_eq!(session.recall_next().as_deref(), Some("b"));
        assert_eq!(session.recall_next().as_deref(), Some(""));
    }
}
