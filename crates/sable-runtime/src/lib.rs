//! Sable Runtime Library
//!
//! C-ABI helpers called from compiled Sable code. The JIT registers these
//! symbols in-process; object files and IR artifacts link against the static
//! archive built from this crate.

use std::cell::RefCell;
use std::io::Write;

/// Symbol name of [`sable_out_int`] as seen by generated code.
pub const OUT_INT_SYMBOL: &str = "sable_out_int";

thread_local! {
    static CAPTURE: RefCell<Option<Vec<String>>> = const { RefCell::new(None) };
}

/// Print an integer followed by a newline. Called by `out` statements.
#[unsafe(no_mangle)]
pub extern "C" fn sable_out_int(value: i64) {
    let line = value.to_string();
    let captured = CAPTURE.with(|capture| match capture.borrow_mut().as_mut() {
        Some(lines) => {
            lines.push(line.clone());
            true
        }
        None => false,
    });
    if !captured {
        let mut stdout = std::io::stdout().lock();
        // Never unwind across the C ABI; a closed stdout just drops output.
        let _ = writeln!(stdout, "{line}");
        let _ = stdout.flush();
    }
}

/// Run `f`, recording the lines printed by [`sable_out_int`] on this thread
/// instead of writing them to stdout.
pub fn capture_output<R>(f: impl FnOnce() -> R) -> (R, Vec<String>) {
    let previous = CAPTURE.with(|capture| capture.replace(Some(Vec::new())));
    let result = f();
    let lines = CAPTURE.with(|capture| capture.replace(previous));
    (result, lines.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_output() {
        let ((), lines) = capture_output(|| {
            sable_out_int(5);
            sable_out_int(-12);
        });
        assert_eq!(lines, vec!["5", "-12"]);
    }

    #[test]
    fn test_nested_capture_restores_outer() {
        let (inner, outer) = capture_output(|| {
            sable_out_int(1);
            let ((), inner) = capture_output(|| sable_out_int(2));
            sable_out_int(3);
            inner
        });
        assert_eq!(inner, vec!["2"]);
        assert_eq!(outer, vec!["1", "3"]);
    }
}
