//! Dockerfile output
//!
//! Each `RUN` section collapses into one instruction joined with
//! `&& \`; other sections emit one instruction per line. Comment lines
//! are not emitted. `OS` and `DEP` have no Dockerfile meaning and are
//! dropped.

use crate::format::Formatter;
use crate::slice::{SectionKind, SliceSection};

const RUN_JOIN: &str = " && \\\n";

#[derive(Debug, Default, Clone, Copy)]
pub struct DockerFormatter;

impl Formatter for DockerFormatter {
    fn write_section(&self, section: &SliceSection, out: &mut String) {
        let kind = section.kind();
        if kind.is_metadata() {
            return;
        }

        if kind == SectionKind::Run {
            let commands: Vec<&str> = section.content_lines().collect();
            if commands.is_empty() {
                return;
            }
            out.push_str("RUN ");
            out.push_str(&commands.join(RUN_JOIN));
            out.push('\n');
            return;
        }

        for line in section.content_lines() {
            out.push_str(kind.as_str());
            out.push(' ');
            out.push_str(line);
            out.push('\n');
        }
    }
}
