/// Chart layer: backend-neutral figure specs and the backends that draw them.
///
/// `spec` is a pure function of the view records; `layout` turns it into
/// ranges, ticks and pixel geometry. The egui window (`ui::plot`), the HTML
/// exporter (`html`) and the rasterizer (`png`) all read the same spec.

pub mod html;
pub mod layout;
pub mod palette;
pub mod png;
pub mod spec;
