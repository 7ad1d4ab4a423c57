//! Terminal rendering of toasts and connection badges
//!
//! Maps the open severity/state vocabularies onto a closed visual one;
//! unknown tokens get a neutral style.

use colored::{ColoredString, Colorize};
use pulsedesk_core::{ConnectionState, ConnectionStatus, Severity, ToastDescriptor};

/// Print one toast line
pub fn print_toast(toast: &ToastDescriptor) {
    println!("{} {}", severity_label(&toast.severity), toast.message);
}

/// Print one connection badge line
pub fn print_badge(status: &ConnectionStatus) {
    let dot = state_dot(&status.state);
    if status.state == ConnectionState::Error && !status.error_detail.is_empty() {
        println!(
            "{dot} {}: {} ({})",
            status.service, status.state, status.error_detail
        );
    } else {
        println!("{dot} {}: {}", status.service, status.state);
    }
}

fn severity_label(severity: &Severity) -> ColoredString {
    let tag = format!("[{severity}]");
    if !severity.is_known() {
        return tag.normal();
    }
    match severity.as_str() {
        Severity::SUCCESS => tag.bright_green(),
        Severity::WARNING => tag.bright_yellow(),
        Severity::DANGER => tag.bright_red(),
        _ => tag.bright_blue(),
    }
}

fn state_dot(state: &ConnectionState) -> ColoredString {
    match state {
        ConnectionState::Connected => "●".bright_green(),
        ConnectionState::Polling => "●".bright_yellow(),
        ConnectionState::Error => "●".bright_red(),
        ConnectionState::Disconnected => "●".bright_black(),
        ConnectionState::Other(_) => "●".normal(),
    }
}
