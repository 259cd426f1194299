// src/cli/mod.rs
//
// Command-line interface module

mod args;
mod output;
mod progress;

pub use args::{BatchArgs, Cli, Command, PipelineArgs, RenderArgs};
pub use output::{print_clip_info, print_json, print_summary, ClipInfo};
pub use progress::ProgressListener;
