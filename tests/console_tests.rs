// Integration tests for the console session against the embedded Forth module

use lampforth::console::session::{STATUS_IDLE, STATUS_READY, STATUS_RESET};
use lampforth::console::{bridge, driver, EvalStatus, Peripherals, Session, SessionConfig};
use lampforth::console::{SessionState, StackView};
use lampforth::error::{ConsoleError, ModuleLoadError};
use lampforth::interpreter::ForthLoader;
use lampforth::module::{status, HostImports, ModuleLoader, VmModule};
use lampforth::snapshot::StackSnapshot;
use std::io::Write;
use std::rc::Rc;

fn started() -> Session {
    let mut session = Session::new(Rc::new(Peripherals::default()));
    session
        .start(&ForthLoader::default(), &SessionConfig::default())
        .expect("module failed to load");
    session
}

fn loaded_module() -> Box<dyn VmModule> {
    let host: Rc<dyn HostImports> = Rc::new(Peripherals::default());
    let mut module = ForthLoader::default().load(host).expect("load failed");
    assert_eq!(module.init(20000, 256), 0);
    driver::drain_output(module.as_mut());
    module
}

#[test]
fn test_arithmetic_leaves_no_output_and_one_cell() {
    let mut session = started();
    let eval = session.submit("2 3 +").unwrap().unwrap();

    assert_eq!(eval.output, "");
    assert_eq!(eval.status, Some(EvalStatus::Completed));
    assert_eq!(session.stack().text(), "n = 1\n0x5");
    assert_eq!(session.status(), STATUS_IDLE);

    let snapshot = StackSnapshot::parse(session.stack().text()).unwrap();
    assert_eq!(snapshot.depth, 1);
    assert_eq!(snapshot.top(), Some(5));
}

#[test]
fn test_startup_banner_is_drained_into_transcript() {
    let session = started();
    assert_eq!(session.state(), SessionState::Ready);
    assert_eq!(session.status(), STATUS_READY);
    assert_eq!(
        session.transcript().get_output(),
        vec![format!("lampforth version {}", env!("CARGO_PKG_VERSION"))]
    );
    assert_eq!(session.stack().text(), "n = 0");
}

#[test]
fn test_accumulator_is_empty_after_every_evaluation() {
    let mut module = loaded_module();
    for line in ["1 2 3", ". . .", ".\" hello\"", "nosuchword", "cr cr", "words"] {
        driver::evaluate(module.as_mut(), line).unwrap();
        assert_eq!(module.output_len(), 0, "after {:?}", line);
    }
}

#[test]
fn test_blank_input_is_a_no_op() {
    let mut session = started();
    session.submit("7").unwrap();
    let transcript = session.transcript().get_output();
    let stack = session.stack().text().to_string();

    for line in ["", " ", "\t\t "] {
        assert!(session.submit(line).unwrap().is_none());
    }
    assert_eq!(session.history().len(), 1);
    assert_eq!(session.transcript().get_output(), transcript);
    assert_eq!(session.stack().text(), stack);
}

#[test]
fn test_errors_arrive_as_output_text() {
    let mut session = started();
    let eval = session.submit("1 foo").unwrap().unwrap();
    assert_eq!(eval.output, "foo not found\n");
    assert_eq!(eval.status, Some(EvalStatus::Failed(status::ERROR_EXIT)));
    // Stacks are reset after an error
    assert_eq!(session.stack().text(), "n = 0");

    let eval = session.submit("drop").unwrap().unwrap();
    assert_eq!(eval.output, "Error: Stack underflow\n");
}

#[test]
fn test_reset_matches_post_init_snapshot() {
    let mut session = started();
    let after_init = session.stack().text().to_string();

    session.submit("1 2 3 4 5 6 7 8 9 10").unwrap();
    assert_ne!(session.stack().text(), after_init);

    session.reset().unwrap();
    assert_eq!(session.stack().text(), after_init);
    assert_eq!(session.status(), STATUS_RESET);
    assert_eq!(session.history().len(), 1);
}

#[test]
fn test_reset_keeps_definitions() {
    let mut session = started();
    session.submit(": sq dup * ;").unwrap();
    session.reset().unwrap();
    session.submit("7 sq").unwrap();
    assert_eq!(session.stack().text(), "n = 1\n0x31");
}

#[test]
fn test_history_recall_order() {
    let mut session = started();
    for line in ["L1", "L2", "L3"] {
        session.submit(line).unwrap();
    }

    let previous: Vec<_> = (0..4).filter_map(|_| session.recall_previous()).collect();
    assert_eq!(previous, vec!["L3", "L2", "L1", "L1"]);

    let next: Vec<_> = (0..4).filter_map(|_| session.recall_next()).collect();
    assert_eq!(next, vec!["L2", "L3", "", ""]);
}

#[test]
fn test_leds_word_drives_lamps() {
    let peripherals = Rc::new(Peripherals::default());
    let mut session = Session::new(Rc::clone(&peripherals));
    session
        .start(&ForthLoader::default(), &SessionConfig::default())
        .unwrap();

    session.submit("255 leds").unwrap();
    session.submit("5 leds").unwrap();
    assert_eq!(
        peripherals.lamps().slots(),
        &[true, false, true, false, false, false, false, false]
    );

    session.submit("256 leds").unwrap();
    assert!(peripherals.lamps().slots().iter().all(|on| !on));

    // Negative cells are reinterpreted as unsigned
    session.submit("-1 leds").unwrap();
    assert!(peripherals.lamps().slots().iter().all(|on| *on));
}

#[test]
fn test_refresh_word_counts_hints() {
    let peripherals = Rc::new(Peripherals::default());
    let mut session = Session::new(Rc::clone(&peripherals));
    session
        .start(&ForthLoader::default(), &SessionConfig::default())
        .unwrap();
    session.submit(": blink 3 0 do i leds refresh loop ;").unwrap();
    session.submit("blink").unwrap();
    assert_eq!(peripherals.take_refresh_requests(), 3);
    assert!(peripherals.lamps().is_on(1));
}

#[test]
fn test_multibyte_input_is_sized_in_bytes() {
    let mut module = loaded_module();
    let eval = driver::evaluate(module.as_mut(), ".\" héllo → ok\"").unwrap();
    assert_eq!(eval.output, "héllo → ok");
}

#[test]
fn test_transient_buffers_are_always_released() {
    let mut module = loaded_module();
    let available = module.stack_available();

    driver::evaluate(module.as_mut(), "1 2 3 nosuchword").unwrap();
    StackView::default().refresh(module.as_mut()).unwrap();
    let huge = "x".repeat(available + 1);
    assert!(bridge::with_input_text(module.as_mut(), &huge, |_, _| ()).is_err());

    assert_eq!(module.stack_available(), available);
}

#[test]
fn test_allocation_failure_keeps_console_usable() {
    let mut session = started();
    let huge = "1 ".repeat(20 * 1024);
    assert!(matches!(
        session.submit(&huge),
        Err(ConsoleError::Allocation(_))
    ));
    assert!(session.history().is_empty());

    session.submit("42").unwrap();
    assert_eq!(session.stack().text(), "n = 1\n0x2a");
}

#[test]
fn test_stack_dump_shows_at_most_eight_cells() {
    let mut session = started();
    session.submit("1 2 3 4 5 6 7 8 9 10").unwrap();
    let snapshot = StackSnapshot::parse(session.stack().text()).unwrap();
    assert_eq!(snapshot.depth, 10);
    assert_eq!(snapshot.cells, vec![10, 9, 8, 7, 6, 5, 4, 3]);
}

#[test]
fn test_small_memory_fails_to_load() {
    let loader = ForthLoader { memory_bytes: 4096 };
    let mut session = Session::new(Rc::new(Peripherals::default()));
    let err = session
        .start(&loader, &SessionConfig::default())
        .unwrap_err();
    assert!(matches!(err, ModuleLoadError::MemoryTooSmall { .. }));
    assert_eq!(session.state(), SessionState::Failed);
    assert!(matches!(session.submit("1"), Err(ConsoleError::NotLoaded)));
}

#[test]
fn test_invalid_dictionary_size_fails_init() {
    let config = SessionConfig {
        dict_cells: 0,
        ..SessionConfig::default()
    };
    let mut session = Session::new(Rc::new(Peripherals::default()));
    let err = session.start(&ForthLoader::default(), &config).unwrap_err();
    assert!(matches!(err, ModuleLoadError::Init(-1)));
}

#[test]
fn test_prelude_is_evaluated_before_ready() {
    let path = std::env::temp_dir().join(format!("lampforth-prelude-{}.fs", std::process::id()));
    {
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "\\ boot words").unwrap();
        writeln!(file, ": triple 3 * ;").unwrap();
        writeln!(file, ".( booted)").unwrap();
    }

    let config = SessionConfig {
        prelude: Some(path.clone()),
        ..SessionConfig::default()
    };
    let mut session = Session::new(Rc::new(Peripherals::default()));
    session.start(&ForthLoader::default(), &config).unwrap();
    std::fs::remove_file(&path).unwrap();

    assert!(session.transcript().get_output().contains(&"booted".to_string()));
    assert!(session.history().is_empty());
    session.submit("5 triple").unwrap();
    assert_eq!(session.stack().text(), "n = 1\n0xf");
}

#[test]
fn test_missing_prelude_fails_load() {
    let config = SessionConfig {
        prelude: Some("/nonexistent/lampforth/prelude.fs".into()),
        ..SessionConfig::default()
    };
    let mut session = Session::new(Rc::new(Peripherals::default()));
    let err = session.start(&ForthLoader::default(), &config).unwrap_err();
    assert!(matches!(err, ModuleLoadError::Prelude { .. }));
}
