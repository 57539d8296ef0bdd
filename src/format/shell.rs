//! Shell script output

use crate::format::Formatter;
use crate::slice::{SectionKind, SliceSection};

/// `OS` lines become comments, `RUN` lines pass through, the rest is dropped
#[derive(Debug, Default, Clone, Copy)]
pub struct ShellFormatter;

impl Formatter for ShellFormatter {
    fn write_section(&self, section: &SliceSection, out: &mut String) {
        match section.kind() {
            SectionKind::Os => {
                for line in section.lines() {
                    out.push_str("# ");
                    out.push_str(line);
                    out.push('\n');
                }
            }
            SectionKind::Run => {
                for line in section.lines() {
                    out.push_str(line);
                    out.push('\n');
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slice::parse_sections;

    #[test]
    fn renders_os_and_run_only() {
        let lines = [
            "OS",
            "debian-8",
            "DEP",
            "ruby-2",
            "RUN",
            "# ruby-2.3",
            "apt-get update",
            "apt-get install -y ruby",
            "EXPOSE",
            "4000",
        ];
        let out = ShellFormatter.write(&parse_sections(&lines));
        assert_eq!(
            out,
            "# debian-8\n# ruby-2.3\napt-get update\napt-get install -y ruby\n"
        );
    }

    #[test]
    fn empty_input_renders_nothing() {
        assert_eq!(ShellFormatter.write(&[]), "");
    }
}
