//! Line-oriented section parser
//!
//! A slice file is a sequence of sections. A line holding nothing but a
//! section keyword (`OS`, `DEP`, `RUN`, ...) opens a section; the
//! following non-blank lines are its body until the next keyword line.

use std::fmt;

/// Section keyword. Tokens are matched case-sensitively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SectionKind {
    Os,
    Dep,
    Add,
    Cmd,
    Copy,
    Entrypoint,
    Env,
    Expose,
    From,
    Label,
    Maintainer,
    Onbuild,
    Run,
    User,
    Volume,
    Workdir,
}

impl SectionKind {
    pub const ALL: [SectionKind; 16] = [
        Self::Os,
        Self::Dep,
        Self::Add,
        Self::Cmd,
        Self::Copy,
        Self::Entrypoint,
        Self::Env,
        Self::Expose,
        Self::From,
        Self::Label,
        Self::Maintainer,
        Self::Onbuild,
        Self::Run,
        Self::User,
        Self::Volume,
        Self::Workdir,
    ];

    /// Keyword as written in slice files
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Os => "OS",
            Self::Dep => "DEP",
            Self::Add => "ADD",
            Self::Cmd => "CMD",
            Self::Copy => "COPY",
            Self::Entrypoint => "ENTRYPOINT",
            Self::Env => "ENV",
            Self::Expose => "EXPOSE",
            Self::From => "FROM",
            Self::Label => "LABEL",
            Self::Maintainer => "MAINTAINER",
            Self::Onbuild => "ONBUILD",
            Self::Run => "RUN",
            Self::User => "USER",
            Self::Volume => "VOLUME",
            Self::Workdir => "WORKDIR",
        }
    }

    /// Match a (trimmed) line against the keyword set
    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == token)
    }

    /// Sections that carry resolution metadata rather than build content
    pub fn is_metadata(self) -> bool {
        matches!(self, Self::Os | Self::Dep)
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One typed block of a slice file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SliceSection {
    kind: SectionKind,
    lines: Vec<String>,
    start_line: usize,
    end_line: usize,
}

impl SliceSection {
    pub fn new(kind: SectionKind, lines: Vec<String>) -> Self {
        Self {
            kind,
            lines,
            start_line: 0,
            end_line: 0,
        }
    }

    pub fn kind(&self) -> SectionKind {
        self.kind
    }

    /// Body lines, trimmed, blank lines excluded
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Offset of the keyword line
    pub fn start_line(&self) -> usize {
        self.start_line
    }

    /// Offset of the last line this section consumed
    pub fn end_line(&self) -> usize {
        self.end_line
    }

    /// Body lines that are not `#` comments
    pub fn content_lines(&self) -> impl Iterator<Item = &str> {
        self.lines
            .iter()
            .map(String::as_str)
            .filter(|line| !line.starts_with('#'))
    }
}

/// Parse the next section at or after `start`.
///
/// Returns `None` when no keyword line remains. A keyword line following
/// an open section ends it without being consumed.
pub fn parse_section<S: AsRef<str>>(lines: &[S], start: usize) -> Option<SliceSection> {
    let mut section: Option<SliceSection> = None;

    for (pos, raw) in lines.iter().enumerate().skip(start) {
        let line = raw.as_ref().trim();
        let keyword = SectionKind::from_token(line);

        if let Some(open) = section.as_mut() {
            if keyword.is_some() {
                break;
            }
            if !line.is_empty() {
                open.lines.push(line.to_string());
                open.end_line = pos;
            }
        } else if let Some(kind) = keyword {
            section = Some(SliceSection {
                kind,
                lines: Vec::new(),
                start_line: pos,
                end_line: pos,
            });
        }
    }

    section
}

/// Parse every section of a file in order
pub fn parse_sections<S: AsRef<str>>(lines: &[S]) -> Vec<SliceSection> {
    let mut sections = Vec::new();
    let mut start = 0;

    while let Some(section) = parse_section(lines, start) {
        start = section.end_line + 1;
        sections.push(section);
    }

    sections
}
