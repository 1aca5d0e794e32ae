//! Built-in transformations.

use crate::transform::{TransformFactory, TransformInputs, Transformation};
use anyhow::{anyhow, bail, Result};
use tracing::debug;

/// Emits the region body unchanged.
#[derive(Default)]
pub struct Passthrough;

impl Passthrough {
    pub fn new() -> Self {
        Self
    }
}

struct PassthroughRun<'a> {
    inputs: TransformInputs<'a>,
}

impl Transformation for PassthroughRun<'_> {
    fn transform(&self) -> Result<String> {
        Ok(self.inputs.body.to_string())
    }
}

impl TransformFactory for Passthrough {
    fn name(&self) -> &str {
        "Passthrough"
    }

    fn create<'a>(&self, inputs: TransformInputs<'a>) -> Result<Box<dyn Transformation + 'a>> {
        Ok(Box::new(PassthroughRun { inputs }))
    }
}

/// Re-indents every non-blank body line to the leader's indentation width.
#[derive(Default)]
pub struct Reindent;

impl Reindent {
    pub fn new() -> Self {
        Self
    }
}

struct ReindentRun<'a> {
    inputs: TransformInputs<'a>,
}

impl Transformation for ReindentRun<'_> {
    fn transform(&self) -> Result<String> {
        let pad = " ".repeat(self.inputs.indent);
        let mut out = String::with_capacity(self.inputs.body.len());
        for line in self.inputs.body.split_inclusive('\n') {
            let content = line.trim_start_matches([' ', '\t']);
            if content.trim().is_empty() {
                out.push_str(line);
            } else {
                out.push_str(&pad);
                out.push_str(content);
            }
        }
        Ok(out)
    }
}

impl TransformFactory for Reindent {
    fn name(&self) -> &str {
        "Reindent"
    }

    fn create<'a>(&self, inputs: TransformInputs<'a>) -> Result<Box<dyn Transformation + 'a>> {
        Ok(Box::new(ReindentRun { inputs }))
    }
}

/// Replaces `${NAME}` placeholders in the body with performance parameter
/// values.
#[derive(Default)]
pub struct Substitute;

impl Substitute {
    pub fn new() -> Self {
        Self
    }
}

struct SubstituteRun<'a> {
    inputs: TransformInputs<'a>,
}

impl Transformation for SubstituteRun<'_> {
    fn transform(&self) -> Result<String> {
        let body = self.inputs.body;
        let mut out = String::with_capacity(body.len());
        let mut rest = body;
        let mut replaced = 0usize;

        while let Some(start) = rest.find("${") {
            out.push_str(&rest[..start]);
            let after = &rest[start + 2..];
            let end = after.find('}').ok_or_else(|| {
                anyhow!(
                    "unterminated placeholder in body of annotation at line {}",
                    self.inputs.line
                )
            })?;
            let name = after[..end].trim();
            let Some(value) = self.inputs.params.get(name) else {
                bail!("unknown performance parameter `{}`", name);
            };
            out.push_str(&value.to_string());
            replaced += 1;
            rest = &after[end + 1..];
        }
        out.push_str(rest);

        debug!(line = self.inputs.line, replaced, "substituted placeholders");
        Ok(out)
    }
}

impl TransformFactory for Substitute {
    fn name(&self) -> &str {
        "Substitute"
    }

    fn create<'a>(&self, inputs: TransformInputs<'a>) -> Result<Box<dyn Transformation + 'a>> {
        Ok(Box::new(SubstituteRun { inputs }))
    }
}
