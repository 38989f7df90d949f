use std::{
    fs,
    path::{Path, PathBuf},
};

use rhai::{AST, Dynamic, Engine, EvalAltResult, Position, Scope};

use crate::{ScriptError, streams};

/// Runs Rhai scripts as if they were the program's own code.
///
/// Each script is compiled under its own path, so errors name the script file
/// and line. While running, `__file__` (and its alias `__script__`) holds the
/// script's absolute path. `print` and `debug` go through the process-wide
/// streams and are therefore captured by an active [`Logger`](crate::Logger).
///
/// Top-level variables and function definitions survive from one script to
/// the next within the same runner, which lets a chain of scripts share state.
///
/// ```rust
/// use transcript::ScriptRunner;
///
/// let dir = std::env::temp_dir();
/// let setup = dir.join("transcript_doc_setup.rhai");
/// let report = dir.join("transcript_doc_report.rhai");
/// std::fs::write(&setup, "fn twice(x) { x * 2 }\nlet total = 21;").unwrap();
/// std::fs::write(&report, "if twice(total) != 42 { throw \"bad total\" }").unwrap();
///
/// let mut runner = ScriptRunner::new();
/// runner.run_all([&setup, &report]).unwrap();
/// ```
pub struct ScriptRunner {
    engine: Engine,
    scope: Scope<'static>,
    /// Functions defined by the scripts run so far.
    functions: AST,
}

impl Default for ScriptRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptRunner {
    pub fn new() -> Self {
        let mut engine = Engine::new();
        engine.on_print(|text| {
            streams::write_stdout(&format!("{text}\n")).ok();
        });
        engine.on_debug(|text, source, position| {
            let origin = source.unwrap_or("<script>");
            let message = match position.line() {
                Some(line) => format!("{origin}:{line}: {text}\n"),
                None => format!("{origin}: {text}\n"),
            };
            streams::write_stderr(&message).ok();
        });
        Self {
            engine,
            scope: Scope::new(),
            functions: AST::empty(),
        }
    }

    /// Reads, compiles and runs the script at `script_path`.
    ///
    /// Errors raised by the script are returned as [`ScriptError::Runtime`]
    /// with the engine's error untouched as its source.
    pub fn run<P: AsRef<Path>>(&mut self, script_path: P) -> Result<(), ScriptError> {
        let path = script_path.as_ref();
        let source = fs::read_to_string(path).map_err(|source| ScriptError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let ast = self.engine.compile(&source).map_err(|source| {
            let position = source.position();
            ScriptError::Parse {
                path: path.to_path_buf(),
                line: position.line(),
                column: position.position(),
                source,
            }
        })?;
        let mut program = self.functions.merge(&ast);
        program.set_source(path.to_string_lossy().into_owned());
        self.functions = self.functions.merge(&ast.clone_functions_only());

        let absolute = absolute_path(path).to_string_lossy().into_owned();
        self.bind_constant("__file__", &absolute);
        self.bind_constant("__script__", &absolute);

        log::debug!("running script {}", path.display());
        self.engine
            .run_ast_with_scope(&mut self.scope, &program)
            .map_err(|source| {
                let (origin, position) = raise_site(&source);
                ScriptError::Runtime {
                    path: origin.unwrap_or_else(|| path.to_path_buf()),
                    line: position.line(),
                    column: position.position(),
                    source,
                }
            })
    }

    /// Binds `name` as a constant, dropping the binding left by a previous run.
    fn bind_constant(&mut self, name: &str, value: &str) {
        while self.scope.remove::<Dynamic>(name).is_some() {}
        self.scope.push_constant(name, value.to_string());
    }

    /// Runs the scripts in order, stopping at the first error.
    pub fn run_all<I, P>(&mut self, scripts: I) -> Result<(), ScriptError>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        for script in scripts {
            self.run(script)?;
        }
        Ok(())
    }
}

/// Runs a single script in a fresh [`ScriptRunner`].
pub fn run_script<P: AsRef<Path>>(script_path: P) -> Result<(), ScriptError> {
    ScriptRunner::new().run(script_path)
}

/// Where an error was actually raised: errors inside function calls are
/// wrapped at each call site, so the innermost error holds the raising line.
/// The path is set when the raising function comes from another script.
fn raise_site(error: &EvalAltResult) -> (Option<PathBuf>, Position) {
    let (source, inner) = match error {
        EvalAltResult::ErrorInFunctionCall(_, source, inner, _) => (source.as_str(), inner),
        EvalAltResult::ErrorInModule(_, inner, _) => ("", inner),
        _ => return (None, error.position()),
    };
    let (origin, position) = raise_site(inner);
    if position.is_none() {
        return (None, error.position());
    }
    let origin = origin.or_else(|| (!source.is_empty()).then(|| PathBuf::from(source)));
    (origin, position)
}

fn absolute_path(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        Logger,
        test_utils::{Console, serial},
    };
    use rhai::EvalAltResult;

    fn write_script(dir: &Path, name: &str, source: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, source).unwrap();
        path
    }

    #[test]
    fn test_runtime_error_names_script_and_line() {
        let dir = tempfile::tempdir().unwrap();
        let script = write_script(dir.path(), "a.rhai", "let ok = 1;\nthrow \"x\";\n");

        let err = run_script(&script).unwrap_err();
        assert_eq!(err.path(), script);
        assert_eq!(err.line(), Some(2));
        match err {
            ScriptError::Runtime { source, .. } => match *source {
                EvalAltResult::ErrorRuntime(value, _) => assert_eq!(value.to_string(), "x"),
                other => panic!("unexpected engine error {other:?}"),
            },
            other => panic!("expected a runtime error, got {other:?}"),
        }
    }

    #[test]
    fn test_error_message_mentions_script() {
        let dir = tempfile::tempdir().unwrap();
        let script = write_script(dir.path(), "fails.rhai", "\n\nthrow \"boom\"");
        let message = run_script(&script).unwrap_err().to_string();
        assert!(message.contains("fails.rhai, line 3"), "{message}");
        assert!(message.contains("boom"), "{message}");
    }

    #[test]
    fn test_prints_own_absolute_path() {
        let _serial = serial();
        let console = Console::capture();
        let dir = tempfile::tempdir().unwrap();
        let script = write_script(dir.path(), "b.rhai", "print(__file__);\nprint(__script__)");

        run_script(&script).unwrap();

        let expected = std::path::absolute(&script).unwrap();
        let expected = expected.to_string_lossy();
        assert_eq!(console.out.contents_string(), format!("{expected}\n{expected}\n"));
    }

    #[test]
    fn test_script_path_reaches_sibling_files() {
        let _serial = serial();
        let console = Console::capture();
        let dir = tempfile::tempdir().unwrap();
        let script = write_script(
            dir.path(),
            "paths.rhai",
            "let parts = __file__.split(\"/\");\nprint(parts[parts.len() - 1]);",
        );
        run_script(&script).unwrap();
        assert_eq!(console.out.contents_string(), "paths.rhai\n");
    }

    #[test]
    fn test_empty_and_unterminated_scripts() {
        let dir = tempfile::tempdir().unwrap();
        let empty = write_script(dir.path(), "empty.rhai", "");
        let unterminated = write_script(dir.path(), "tail.rhai", "let x = 1 + 1");
        run_script(&empty).unwrap();
        run_script(&unterminated).unwrap();
    }

    #[test]
    fn test_syntax_error_carries_location() {
        let dir = tempfile::tempdir().unwrap();
        let script = write_script(dir.path(), "broken.rhai", "let a = 1;\nlet = 2;\n");
        let err = run_script(&script).unwrap_err();
        assert!(matches!(err, ScriptError::Parse { .. }));
        assert_eq!(err.path(), script);
        assert_eq!(err.line(), Some(2));
    }

    #[test]
    fn test_missing_script_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.rhai");
        let err = run_script(&missing).unwrap_err();
        assert!(matches!(err, ScriptError::Io { .. }));
        assert_eq!(err.line(), None);
    }

    #[test]
    fn test_chained_scripts_share_variables() {
        let _serial = serial();
        let console = Console::capture();
        let dir = tempfile::tempdir().unwrap();
        let first = write_script(dir.path(), "first.rhai", "let answer = 41;");
        let second = write_script(
            dir.path(),
            "second.rhai",
            "print(answer + 1);\nprint(__file__);",
        );

        let mut runner = ScriptRunner::new();
        runner.run_all([&first, &second]).unwrap();

        let shown = console.out.contents_string();
        let lines: Vec<_> = shown.lines().collect();
        assert_eq!(lines[0], "42");
        assert!(lines[1].ends_with("second.rhai"));
    }

    #[test]
    fn test_chained_scripts_share_functions() {
        let _serial = serial();
        let console = Console::capture();
        let dir = tempfile::tempdir().unwrap();
        let helpers = write_script(
            dir.path(),
            "helpers.rhai",
            "fn double(x) { x * 2 }\nlet base = 21;",
        );
        let main = write_script(dir.path(), "main.rhai", "let v = double(base);\nprint(v);");

        let mut runner = ScriptRunner::new();
        runner.run_all([&helpers, &main]).unwrap();
        assert_eq!(console.out.contents_string(), "42\n");
    }

    #[test]
    fn test_error_in_function_reports_raising_line() {
        let dir = tempfile::tempdir().unwrap();
        let script = write_script(
            dir.path(),
            "nested.rhai",
            "fn f() {\n    throw \"x\";\n}\nf();\n",
        );

        let err = run_script(&script).unwrap_err();
        assert_eq!(err.line(), Some(2));
        match err {
            ScriptError::Runtime { source, .. } => {
                assert!(matches!(*source, EvalAltResult::ErrorInFunctionCall(..)))
            }
            other => panic!("expected a runtime error, got {other:?}"),
        }
    }

    #[test]
    fn test_rerun_does_not_grow_scope() {
        let dir = tempfile::tempdir().unwrap();
        let script = write_script(
            dir.path(),
            "noop.rhai",
            "if __file__.len() == 0 { throw \"empty\" }",
        );
        let mut runner = ScriptRunner::new();
        for _ in 0..3 {
            runner.run(&script).unwrap();
            assert_eq!(runner.scope.len(), 2);
        }
    }

    #[test]
    fn test_run_all_stops_at_first_error() {
        let _serial = serial();
        let console = Console::capture();
        let dir = tempfile::tempdir().unwrap();
        let good = write_script(dir.path(), "good.rhai", "print(\"good\");");
        let bad = write_script(dir.path(), "bad.rhai", "throw \"bad\";");
        let never = write_script(dir.path(), "never.rhai", "print(\"never\");");

        let err = ScriptRunner::new().run_all([&good, &bad, &never]).unwrap_err();
        assert_eq!(err.path(), bad);
        assert_eq!(console.out.contents_string(), "good\n");
    }

    #[test]
    fn test_script_output_lands_in_active_log() {
        let _serial = serial();
        let _console = Console::capture();
        let dir = tempfile::tempdir().unwrap();
        let log_path = dir.path().join("scripts.log");
        let script = write_script(
            dir.path(),
            "report.rhai",
            "print(\"mean = 2.5\");\ndebug(\"checked\");",
        );

        let mut logger = Logger::new(&log_path, false);
        logger.init().unwrap();
        run_script(&script).unwrap();
        logger.close().unwrap();

        let content = fs::read_to_string(&log_path).unwrap();
        assert!(content.starts_with("mean = 2.5\n"), "{content}");
        let debug_line = content.lines().nth(1).unwrap();
        assert!(debug_line.ends_with("report.rhai:2: \"checked\""), "{content}");
    }
}
