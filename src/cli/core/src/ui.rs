/* src/cli/core/src/ui.rs */

pub const RESET: &str = "\x1b[0m";
pub const BOLD: &str = "\x1b[1m";
pub const DIM: &str = "\x1b[2m";
pub const RED: &str = "\x1b[31m";
pub const GREEN: &str = "\x1b[32m";
pub const YELLOW: &str = "\x1b[33m";
pub const CYAN: &str = "\x1b[36m";

const VERSION: &str = env!("CARGO_PKG_VERSION");

pub fn ok(msg: &str) {
  println!("  {GREEN}\u{2713}{RESET} {msg}");
}

pub fn fail(msg: &str) {
  println!("  {RED}\u{2717}{RESET} {msg}");
}

pub fn warn(msg: &str) {
  println!("  {YELLOW}!{RESET} {msg}");
}

pub fn arrow(msg: &str) {
  println!("  {GREEN}\u{2192}{RESET} {msg}");
}

pub fn detail(msg: &str) {
  println!("        {msg}");
}

pub fn banner(cmd: &str, project: &str) {
  println!();
  println!("  {BOLD}waypoint{RESET} {cmd} {DIM}{project} v{VERSION}{RESET}");
  println!();
}

pub fn blank() {
  println!();
}

/// Print a JSON value pretty-printed, indented to line up with `detail`.
pub fn json(value: &serde_json::Value) {
  let text = serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string());
  for line in text.lines() {
    detail(line);
  }
}
