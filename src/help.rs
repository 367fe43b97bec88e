use std::fmt::{self, Write};

use crate::{
    error::dashed,
    param::{ParamInfo, ParamKind},
};

macro_rules! w {
    ($($tt:tt)*) => {
        drop(write!($($tt)*))
    };
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub title: &'static str,
    pub lines: Vec<String>,
}

/// Help for one command, split into titled sections. Empty sections are
/// never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HelpDoc {
    pub sections: Vec<Section>,
}

impl HelpDoc {
    pub(crate) fn build(
        path: &[String],
        description: Option<&str>,
        params: &[ParamInfo],
        subcommands: &[(String, Option<String>)],
    ) -> HelpDoc {
        let (arguments, flags): (Vec<_>, Vec<_>) =
            params.iter().partition(|it| it.single.kind == ParamKind::Argument);

        let mut doc = HelpDoc { sections: Vec::new() };
        if let Some(description) = description {
            doc.push("DESCRIPTION", description.lines().map(String::from).collect());
        }
        doc.push("USAGE", vec![usage(path, &arguments, !subcommands.is_empty())]);
        doc.push("ARGUMENTS", table(arguments.iter().map(|it| argument_row(it)).collect()));
        doc.push("FLAGS", table(flags.iter().map(|it| flag_row(it)).collect()));
        doc.push(
            "SUBCOMMANDS",
            table(
                subcommands
                    .iter()
                    .map(|(name, description)| {
                        (name.clone(), description.clone().unwrap_or_default())
                    })
                    .collect(),
            ),
        );
        doc
    }

    fn push(&mut self, title: &'static str, lines: Vec<String>) {
        if !lines.is_empty() {
            self.sections.push(Section { title, lines })
        }
    }
}

impl fmt::Display for HelpDoc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut blank = "";
        for section in &self.sections {
            writeln!(f, "{blank}{}", section.title)?;
            blank = "\n";
            for line in &section.lines {
                if line.is_empty() {
                    writeln!(f)?;
                } else {
                    writeln!(f, "  {line}")?;
                }
            }
        }
        Ok(())
    }
}

fn usage(path: &[String], arguments: &[&ParamInfo], has_subcommands: bool) -> String {
    let mut buf = path.join(" ");
    if has_subcommands {
        w!(buf, " <subcommand>");
    }
    w!(buf, " [flags]");
    for arg in arguments {
        let dots = if arg.variadic { "..." } else { "" };
        let (l, r) = if arg.optional { ("[", "]") } else { ("", "") };
        w!(buf, " {l}<{}{dots}>{r}", arg.single.name);
    }
    buf
}

fn argument_row(info: &ParamInfo) -> (String, String) {
    let dots = if info.variadic { "..." } else { "" };
    let mut right = info.single.description.clone().unwrap_or_default();
    if info.optional {
        if !right.is_empty() {
            right.push(' ');
        }
        right.push_str("(optional)");
    }
    (format!("<{}{dots}>", info.single.name), right)
}

fn flag_row(info: &ParamInfo) -> (String, String) {
    let single = &info.single;
    let mut left = single.names().map(dashed).collect::<Vec<_>>().join(", ");
    if !single.primitive.is_boolean() {
        w!(left, " <{}>", single.type_name());
    }
    (left, single.description.clone().unwrap_or_default())
}

/// Two aligned columns; continuation lines of the right column are indented
/// to match.
fn table(rows: Vec<(String, String)>) -> Vec<String> {
    let width = rows.iter().map(|(left, _)| left.chars().count()).max().unwrap_or(0);
    let mut res = Vec::new();
    for (left, right) in rows {
        let mut lines = right.lines();
        match lines.next() {
            Some(first) => res.push(format!("{left:width$}  {first}")),
            None => res.push(left),
        }
        for line in lines {
            res.push(format!("{:width$}  {line}", ""));
        }
    }
    res
}
