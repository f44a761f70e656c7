// Compact take on pretty_env_logger: timestamp, colored level, message.
// Continuation lines of multi-line messages are indented under the message.

use std::io::Write as _;

use env_logger::{
    fmt::{Color, Style, StyledValue},
    Builder, Env,
};
use log::Level;

// 24 (timestamp) + 1 space + 5 (level) + " > "
const MESSAGE_INDENT: usize = 33;

/// Installs the global logger. `RUST_LOG` takes precedence over `default_level`.
pub fn init(default_level: &str) {
    let env = Env::default().filter_or("RUST_LOG", default_level);

    Builder::from_env(env)
        .format(|buf, record| {
            let mut style = buf.style();
            let level = colored_level(&mut style, record.level());
            let time = buf.timestamp_millis();
            let text = record.args().to_string();

            let mut lines = text.lines();
            writeln!(buf, "{time} {level} > {}", lines.next().unwrap_or_default())?;

            for line in lines {
                writeln!(buf, "{:width$}{line}", "", width = MESSAGE_INDENT)?;
            }

            Ok(())
        })
        .init();
}

fn colored_level(style: &'_ mut Style, level: Level) -> StyledValue<'_, &'static str> {
    match level {
        Level::Trace => style.set_color(Color::Magenta).value("TRACE"),
        Level::Debug => style.set_color(Color::Blue).value("DEBUG"),
        Level::Info => style.set_color(Color::Green).value("INFO "),
        Level::Warn => style.set_color(Color::Yellow).value("WARN "),
        Level::Error => style.set_color(Color::Red).value("ERROR"),
    }
}
