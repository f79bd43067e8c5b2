//! A minimal interactive demo: two panes side by side, a scrollable
//! selectable list on the left and an editable scratch line on the
//! right. Arrow keys move line focus, Enter selects, `q` quits.

use trellis::{
    Axis, Component, Config, Context, EolPolicy, Feature, Highlight, Trellis,
    backend::crossterm::runloop,
    feature,
};

/// A list of selectable entries; selection is echoed into the title line.
struct Picker;

impl Component for Picker {
    fn on_init(&mut self, ctx: &mut Context<'_>) {
        ctx.push_line(trellis::Line::unfocusable("pick an entry:"));
        for i in 1..=40 {
            ctx.push_line(format!("entry {i}"));
        }
        ctx.features_mut().add(feature::LINE_SELECTABLE);
        ctx.features_mut().add(feature::SCROLLABLE);
        ctx.features_mut().add(Feature::Focusable);
        ctx.set_highlight(Highlight::Trimmed);
    }

    fn on_line_selected(&mut self, ctx: &mut Context<'_>, idx: usize) {
        let text = ctx
            .state()
            .line(idx)
            .map(|l| l.text().to_string())
            .unwrap_or_default();
        ctx.with_line(0, |l| l.set_text(format!("picked: {text}")));
    }
}

/// A single editable line.
struct Scratch;

impl Component for Scratch {
    fn on_init(&mut self, ctx: &mut Context<'_>) {
        ctx.push_line("type here");
        ctx.features_mut().add(feature::LINE_SELECTABLE);
        ctx.features_mut().add(feature::CELL_FOCUSABLE);
        ctx.features_mut().add(Feature::Editable);
        ctx.features_mut().add(Feature::Focusable);
        ctx.set_eol_policy(EolPolicy::PastLastRune);
    }
}

fn main() -> trellis::Result<()> {
    let mut ui = Trellis::new(Config::new());
    let root = ui.root();
    ui.set_axis(root, Axis::Chained);
    let picker = ui.add_child(root, Picker);
    ui.add_child(root, Scratch);
    ui.events().focus(picker)?;
    runloop(ui)
}
