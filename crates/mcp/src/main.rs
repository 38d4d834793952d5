#![forbid(unsafe_code)]

mod entry;
mod handlers;
mod server;
mod support;
mod tools;

pub(crate) use support::jsonrpc::JsonRpcRequest;

use std::fmt::Write as _;
use std::path::PathBuf;

// Protocol negotiation: some MCP clients are strict about the server echoing
// a compatible protocol version, so this stays at the widely deployed
// baseline.
const MCP_VERSION: &str = "2024-11-05";
const SERVER_NAME: &str = "northstar-mcp";
const SERVER_VERSION: &str = "0.1.0";

const DEFAULT_ROOT_DIR: &str = ".northstar";
const ROOT_DIR_ENV: &str = "NORTHSTAR_ROOT";

/// One server process over a root directory of project subdirectories.
/// All document state lives on disk; the only in-process state is the MCP
/// handshake flag.
pub(crate) struct McpServer {
    initialized: bool,
    root_dir: PathBuf,
}

fn write_last_crash(root_dir: &std::path::Path, kind: &str, detail: &str) {
    // Best-effort crash report for debugging transport issues without
    // logging request bodies.
    let _ = std::fs::create_dir_all(root_dir);
    let path = root_dir.join("northstar_mcp_last_crash.txt");

    let mut out = String::new();
    let ts_ms = support::time::now_ms_i64();
    let _ = writeln!(out, "ts={}", support::time::ts_ms_to_rfc3339(ts_ms));
    let _ = writeln!(out, "pid={}", std::process::id());
    let _ = writeln!(out, "kind={kind}");
    let _ = writeln!(out, "build={}", support::build_info::build_fingerprint());
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let _ = writeln!(out, "cwd={}", cwd.to_string_lossy());
    let _ = writeln!(out, "args={:?}", std::env::args().collect::<Vec<_>>());
    let _ = writeln!(out, "detail={detail}");

    let _ = std::fs::write(path, out);
}

fn install_crash_reporter(root_dir: PathBuf) {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let mut detail = info.to_string();
        let backtrace = std::backtrace::Backtrace::force_capture();
        let _ = write!(&mut detail, "\nbacktrace:\n{backtrace}");
        write_last_crash(&root_dir, "panic", &detail);
        default_hook(info);
    }));
}

fn parse_root_dir() -> PathBuf {
    let args = std::env::args().collect::<Vec<_>>();
    for (index, arg) in args.iter().enumerate() {
        if arg == "--root-dir" {
            if let Some(value) = args.get(index + 1) {
                return PathBuf::from(value);
            }
        }
        if let Some(value) = arg.strip_prefix("--root-dir=") {
            return PathBuf::from(value);
        }
    }
    if let Ok(value) = std::env::var(ROOT_DIR_ENV) {
        if !value.trim().is_empty() {
            return PathBuf::from(value);
        }
    }
    PathBuf::from(DEFAULT_ROOT_DIR)
}

fn usage() -> &'static str {
    "ns_mcp — Northstar document lifecycle MCP server (stdio)\n\n\
USAGE:\n\
  ns_mcp [--root-dir DIR]\n\
\n\
FLAGS:\n\
  -h, --help       Print this help and exit\n\
  -V, --version    Print version/build and exit\n\
\n\
NOTES:\n\
  - Root default: ./.northstar (or NORTHSTAR_ROOT)\n\
  - Each project is a subdirectory of the root; each document one .md file\n"
}

fn version_line() -> String {
    format!(
        "ns_mcp {SERVER_VERSION} build={}",
        support::build_info::build_fingerprint()
    )
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = std::env::args().collect::<Vec<_>>();
    if args
        .iter()
        .any(|arg| matches!(arg.as_str(), "-h" | "--help"))
    {
        print!("{}", usage());
        return Ok(());
    }
    if args
        .iter()
        .any(|arg| matches!(arg.as_str(), "-V" | "--version"))
    {
        println!("{}", version_line());
        return Ok(());
    }

    let root_dir = parse_root_dir();
    install_crash_reporter(root_dir.clone());

    let mut server = McpServer::new(root_dir.clone());
    let result = entry::run_stdio(&mut server);
    if let Err(err) = &result {
        write_last_crash(&root_dir, "error", &format!("{err:?}"));
    }
    result
}
