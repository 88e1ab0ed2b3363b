use crate::tools::{PointerEvent, Tool, ToolCtx};

/// Text tool: a press asks the host to open its inline editor at the
/// clicked canvas position. Rasterization and the history push happen in
/// the host when the editor is confirmed, so the tool itself only manages
/// the prompt.
#[derive(Default)]
pub struct TextTool;

impl Tool for TextTool {
    fn name(&self) -> &'static str {
        "Text"
    }

    fn on_select(&mut self, ctx: &mut ToolCtx) {
        *ctx.status = "Text: click to place text".to_string();
    }

    fn on_deselect(&mut self, ctx: &mut ToolCtx) {
        *ctx.text_prompt = None;
    }

    fn on_press(&mut self, ctx: &mut ToolCtx, ev: &PointerEvent) {
        *ctx.text_prompt = Some((ev.x, ev.y));
        *ctx.status = "Text: type, then Enter to place or Esc to discard".to_string();
    }

    fn on_cancel(&mut self, ctx: &mut ToolCtx) {
        *ctx.text_prompt = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testutil::{ev, Rig};

    #[test]
    fn test_press_opens_prompt() {
        let mut rig = Rig::new(32, 32);
        let mut tool = TextTool;
        tool.on_press(&mut rig.ctx(), &ev(12.0, 7.0));
        assert_eq!(rig.text_prompt, Some((12.0, 7.0)));
        assert_eq!(rig.history.depth(), 1);
    }

    #[test]
    fn test_cancel_closes_prompt() {
        let mut rig = Rig::new(32, 32);
        let mut tool = TextTool;
        tool.on_press(&mut rig.ctx(), &ev(1.0, 1.0));
        tool.on_cancel(&mut rig.ctx());
        assert_eq!(rig.text_prompt, None);
    }
}
