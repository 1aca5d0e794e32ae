//! Fragment tree builder entrypoints and helpers.

use crate::fragment::{CodeFragment, LeaderAnnotation, TrailerAnnotation, PERF_TUNING_KIND};

#[derive(Debug, Default, Clone)]
pub struct FragmentBuilder {
    fragments: Vec<CodeFragment>,
}

impl FragmentBuilder {
    pub fn new() -> Self {
        Self {
            fragments: Vec::new(),
        }
    }

    pub fn fragments(&self) -> &[CodeFragment] {
        &self.fragments
    }

    pub fn add_plain<C: Into<String>>(mut self, code: C) -> Self {
        self.fragments.push(CodeFragment::plain(code));
        self
    }

    pub fn add_region(
        mut self,
        leader: LeaderAnnotation,
        children: Vec<CodeFragment>,
        trailer: TrailerAnnotation,
    ) -> Self {
        self.fragments
            .push(CodeFragment::region(leader, children, trailer));
        self
    }

    /// Add a `PerfTuning` region whose leader and trailer render with the
    /// default annotation syntax.
    pub fn add_perf_tuning<B: Into<String>>(
        self,
        body: B,
        line: usize,
        children: Vec<CodeFragment>,
    ) -> Self {
        let end_line = line + 1 + children.len();
        self.add_region(
            leader(PERF_TUNING_KIND, body, line),
            children,
            trailer(end_line),
        )
    }

    pub fn add_fragment(mut self, fragment: CodeFragment) -> Self {
        self.fragments.push(fragment);
        self
    }

    pub fn build(self) -> Vec<CodeFragment> {
        self.fragments
    }
}

pub fn leader<K: Into<String>, B: Into<String>>(kind: K, body: B, line: usize) -> LeaderAnnotation {
    LeaderAnnotation::new(kind, body, line)
}

pub fn trailer(line: usize) -> TrailerAnnotation {
    TrailerAnnotation::new("/*@ end @*/", line)
}

/// Reassemble the unoptimized source that a fragment sequence was built from.
pub fn render_source(fragments: &[CodeFragment]) -> String {
    let mut text = String::new();
    let mut stack: Vec<Pending<'_>> = fragments.iter().rev().map(Pending::Fragment).collect();
    while let Some(item) = stack.pop() {
        match item {
            Pending::Text(literal) => text.push_str(literal),
            Pending::Fragment(CodeFragment::Plain(plain)) => text.push_str(&plain.code),
            Pending::Fragment(CodeFragment::Region(region)) => {
                stack.push(Pending::Text(&region.trailer.text));
                stack.extend(region.children.iter().rev().map(Pending::Fragment));
                stack.push(Pending::Text(&region.leader.text));
            }
        }
    }
    text
}

enum Pending<'a> {
    Text(&'a str),
    Fragment(&'a CodeFragment),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_preserves_order() {
        let fragments = FragmentBuilder::new()
            .add_plain("int a;\n")
            .add_region(
                leader("Passthrough", "", 2),
                vec![CodeFragment::plain("a = 1;\n")],
                trailer(4),
            )
            .add_plain("return a;\n")
            .build();
        assert_eq!(fragments.len(), 3);
        assert!(fragments[1].as_region().is_some());
        assert!(fragments[0].as_region().is_none());
    }

    #[test]
    fn test_render_source_nested() {
        let inner = CodeFragment::region(
            leader("Inner", "", 2).with_text("<i>"),
            vec![CodeFragment::plain("body")],
            TrailerAnnotation::new("</i>", 2),
        );
        let fragments = FragmentBuilder::new()
            .add_plain("pre ")
            .add_region(
                leader("Outer", "", 1).with_text("<o>"),
                vec![CodeFragment::plain("a"), inner, CodeFragment::plain("b")],
                TrailerAnnotation::new("</o>", 3),
            )
            .add_plain(" post")
            .build();
        assert_eq!(render_source(&fragments), "pre <o>a<i>body</i>b</o> post");
    }

    #[test]
    fn test_perf_tuning_helper() {
        let fragments = FragmentBuilder::new()
            .add_perf_tuning("import spec s;", 1, vec![CodeFragment::plain("x")])
            .build();
        let region = fragments[0].as_region().unwrap();
        assert!(region.is_perf_tuning());
        assert_eq!(region.trailer.line, 3);
    }
}
