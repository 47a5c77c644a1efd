//! Typed page descriptors and the builder turning them into a live
//! controller.
//!
//! A page is four collections: fonts, widgets, canvases, and
//! sequences. The records are fully typed — an ill-formed record is
//! rejected while loading, not discovered mid-tick. Recoverable
//! problems (a missing widget, a bad conditional, an unknown effect)
//! skip the offending entry with a warning; only structural problems
//! (unreadable JSON, canvas cycles) fail the build.

use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use serde::Deserialize;
use tracing::{error, warn};

use crate::clock::Clock;
use crate::conditional::Conditional;
use crate::controller::DisplayController;
use crate::error::{MarqueeError, Result};
use crate::font::FontPack;
use crate::geometry::{Point, Size};
use crate::sequence::Sequence;
use crate::vars::VarStore;
use crate::widget::{
    shared_boxed, BarStyle, Canvas, Direction, Endpoint, Hesitate, Justify, LineWidget, Popup,
    ProgressBar, RectangleWidget, Scroll, Text, Widget, WidgetRef,
};

/// A full page descriptor.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct PageDef {
    /// Named fonts; values carry the font file for the host to decode.
    #[serde(default)]
    pub fonts: HashMap<String, FontDef>,
    /// Named leaf widgets.
    #[serde(default)]
    pub widgets: HashMap<String, WidgetDef>,
    /// Named canvases composing widgets (and other canvases).
    #[serde(default)]
    pub canvases: HashMap<String, CanvasDef>,
    /// Sequences in declaration (compose) order.
    #[serde(default)]
    pub sequences: Vec<SequenceDef>,
}

impl PageDef {
    /// Parse a page from its JSON form.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| MarqueeError::Page(e.to_string()))
    }
}

/// A font entry: the file the host decodes into a [`FontPack`].
#[derive(Clone, Debug, Deserialize)]
pub struct FontDef {
    /// Path of the font file.
    pub file: String,
}

/// Horizontal justification in page records.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JustDef {
    /// Left-aligned.
    #[default]
    Left,
    /// Centered.
    Center,
    /// Right-aligned.
    Right,
}

impl From<JustDef> for Justify {
    fn from(j: JustDef) -> Self {
        match j {
            JustDef::Left => Justify::Left,
            JustDef::Center => Justify::Center,
            JustDef::Right => Justify::Right,
        }
    }
}

/// Progress bar style in page records.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StyleDef {
    /// Square end caps.
    #[default]
    Square,
    /// Rounded end caps.
    Rounded,
}

impl From<StyleDef> for BarStyle {
    fn from(s: StyleDef) -> Self {
        match s {
            StyleDef::Square => BarStyle::Square,
            StyleDef::Rounded => BarStyle::Rounded,
        }
    }
}

/// Scroll direction in page records.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DirectionDef {
    /// Scroll left.
    #[default]
    Left,
    /// Scroll right.
    Right,
    /// Scroll up.
    Up,
    /// Scroll down.
    Down,
}

impl From<DirectionDef> for Direction {
    fn from(d: DirectionDef) -> Self {
        match d {
            DirectionDef::Left => Direction::Left,
            DirectionDef::Right => Direction::Right,
            DirectionDef::Up => Direction::Up,
            DirectionDef::Down => Direction::Down,
        }
    }
}

/// Hesitation mode in page records.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HesitateDef {
    /// Never pause.
    None,
    /// Pause before the first shift only.
    Onstart,
    /// Pause on start and on every loop.
    #[default]
    Onloop,
}

impl From<HesitateDef> for Hesitate {
    fn from(h: HesitateDef) -> Self {
        match h {
            HesitateDef::None => Hesitate::None,
            HesitateDef::Onstart => Hesitate::OnStart,
            HesitateDef::Onloop => Hesitate::OnLoop,
        }
    }
}

/// A numeric literal or the name of a store variable.
#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub enum NumOrVar {
    /// A fixed number.
    Num(f64),
    /// A variable reference.
    Var(String),
}

impl From<&NumOrVar> for Endpoint {
    fn from(v: &NumOrVar) -> Self {
        match v {
            NumOrVar::Num(n) => Endpoint::Literal(*n),
            NumOrVar::Var(name) => Endpoint::Var(name.clone()),
        }
    }
}

/// A leaf widget record, tagged by `type`.
#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum WidgetDef {
    /// A text widget.
    Text {
        /// Positional format template.
        format: String,
        /// Variable tokens filling the template.
        #[serde(default)]
        variables: Vec<String>,
        /// Name of the font to render with.
        font: String,
        /// Line justification.
        #[serde(default)]
        just: JustDef,
        /// Minimum size; `(0, 0)` sizes to the text.
        #[serde(default)]
        size: (u32, u32),
        /// Variable pitch instead of monospace.
        #[serde(default)]
        varwidth: bool,
        /// Optional animation wrapper.
        #[serde(default)]
        effect: Option<EffectDef>,
    },
    /// A progress bar.
    Progressbar {
        /// Current value.
        value: NumOrVar,
        /// `(low, high)` range.
        #[serde(default = "default_range")]
        rangeval: (NumOrVar, NumOrVar),
        /// Bar size.
        size: (u32, u32),
        /// Track style.
        #[serde(default)]
        style: StyleDef,
        /// Optional animation wrapper.
        #[serde(default)]
        effect: Option<EffectDef>,
    },
    /// A line from the origin.
    Line {
        /// Far endpoint.
        point: (i32, i32),
        /// Pixel value to draw with (0 or 1).
        #[serde(default = "default_on")]
        color: u8,
        /// Optional animation wrapper.
        #[serde(default)]
        effect: Option<EffectDef>,
    },
    /// A rectangle from the origin.
    Rectangle {
        /// Far corner.
        point: (i32, i32),
        /// Interior pixel value.
        #[serde(default)]
        fill: u8,
        /// Border pixel value.
        #[serde(default = "default_on")]
        outline: u8,
        /// Optional animation wrapper.
        #[serde(default)]
        effect: Option<EffectDef>,
    },
}

fn default_range() -> (NumOrVar, NumOrVar) {
    (NumOrVar::Num(0.0), NumOrVar::Num(100.0))
}

fn default_on() -> u8 {
    1
}

/// A canvas record.
#[derive(Clone, Debug, Deserialize)]
pub struct CanvasDef {
    /// Canvas size.
    pub size: (u32, u32),
    /// Children: `(widget name, x, y)` in paint order.
    #[serde(default)]
    pub widgets: Vec<(String, i32, i32)>,
    /// Optional animation wrapper.
    #[serde(default)]
    pub effect: Option<EffectDef>,
}

/// An animation wrapper record, tagged by `type`.
#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum EffectDef {
    /// Scroll the widget.
    Scroll {
        /// Scroll direction.
        #[serde(default)]
        direction: DirectionDef,
        /// Pixels per tick.
        #[serde(default = "default_distance")]
        distance: u32,
        /// Gap between tail and wrapped head.
        #[serde(default = "default_gap")]
        gap: u32,
        /// Hesitation mode.
        #[serde(default)]
        hesitate: HesitateDef,
        /// Hesitation duration in seconds.
        #[serde(default = "default_hesitate_time")]
        hesitate_time: f64,
        /// Scroll only when larger than this along the axis.
        #[serde(default)]
        threshold: u32,
    },
    /// Pop the widget up through a window.
    Popup {
        /// Window height in pixels.
        height: u32,
        /// Seconds resting at the top.
        #[serde(default = "default_duration")]
        duration: f64,
        /// Seconds resting at the bottom.
        #[serde(default = "default_popup_duration")]
        popup_duration: f64,
    },
}

fn default_distance() -> u32 {
    1
}

fn default_gap() -> u32 {
    20
}

fn default_hesitate_time() -> f64 {
    2.0
}

fn default_duration() -> f64 {
    15.0
}

fn default_popup_duration() -> f64 {
    10.0
}

/// A sequence record.
#[derive(Clone, Debug, Deserialize)]
pub struct SequenceDef {
    /// Sequence name (for logs).
    #[serde(default)]
    pub name: String,
    /// Sequence-level conditional expression.
    #[serde(default = "default_conditional")]
    pub conditional: String,
    /// Seconds to stay off the panel after displaying.
    #[serde(default)]
    pub coolingperiod: f64,
    /// Seconds to stay displayable once activated.
    #[serde(default)]
    pub minimum: f64,
    /// Compose offset.
    #[serde(default)]
    pub coordinates: (i32, i32),
    /// Items in rotation order.
    #[serde(default)]
    pub canvases: Vec<SequenceItemDef>,
}

/// One sequence item.
#[derive(Clone, Debug, Deserialize)]
pub struct SequenceItemDef {
    /// Widget or canvas name.
    pub name: String,
    /// Seconds to display this item.
    pub duration: f64,
    /// Item-level conditional expression.
    #[serde(default = "default_conditional")]
    pub conditional: String,
}

fn default_conditional() -> String {
    "True".to_string()
}

/// Builds a [`DisplayController`] from a [`PageDef`].
///
/// The host registers decoded font packs by name before building;
/// decoding the files themselves is outside the engine.
pub struct PageBuilder {
    db: VarStore,
    dbp: VarStore,
    clock: Clock,
    fonts: HashMap<String, Rc<FontPack>>,
}

impl PageBuilder {
    /// Create a builder over the given stores and clock.
    pub fn new(db: VarStore, dbp: VarStore, clock: Clock) -> Self {
        Self {
            db,
            dbp,
            clock,
            fonts: HashMap::new(),
        }
    }

    /// Register a decoded font pack under `name`.
    #[must_use]
    pub fn with_font(mut self, name: impl Into<String>, pack: FontPack) -> Self {
        self.fonts.insert(name.into(), Rc::new(pack));
        self
    }

    /// Build the controller. Bad records are skipped with a warning;
    /// canvas cycles and unreadable structure fail the build.
    pub fn build(&self, page: &PageDef, panel: Size) -> Result<DisplayController> {
        let mut widgets: HashMap<String, WidgetRef> = HashMap::new();

        for (name, def) in &page.widgets {
            match self.build_widget(name, def) {
                Ok(widget) => {
                    widgets.insert(name.clone(), widget);
                }
                Err(e) => warn!(widget = %name, error = %e, "skipping widget"),
            }
        }

        // Canvases may nest; resolve depth-first and refuse cycles.
        let mut visiting = HashSet::new();
        let canvas_names: Vec<String> = page.canvases.keys().cloned().collect();
        for name in canvas_names {
            self.build_canvas(&name, page, &mut widgets, &mut visiting)?;
        }

        let mut controller =
            DisplayController::new(panel, self.db.clone(), self.dbp.clone(), self.clock.clone());
        for def in &page.sequences {
            match self.build_sequence(def, &widgets) {
                Some(seq) => controller.add_sequence(seq),
                None => warn!(sequence = %def.name, "dropping sequence with no usable items"),
            }
        }
        Ok(controller)
    }

    fn conditional_or_never(&self, source: &str, context: &str) -> Conditional {
        match Conditional::parse(source) {
            Ok(c) => c,
            Err(e) => {
                warn!(%context, error = %e, "conditional failed to parse, treating as false");
                Conditional::never()
            }
        }
    }

    fn build_widget(&self, name: &str, def: &WidgetDef) -> Result<WidgetRef> {
        let (widget, effect): (Box<dyn Widget>, &Option<EffectDef>) = match def {
            WidgetDef::Text {
                format,
                variables,
                font,
                just,
                size,
                varwidth,
                effect,
            } => {
                if format.is_empty() {
                    return Err(MarqueeError::InvalidWidgetSpec(
                        name.to_string(),
                        "text widget needs a format".into(),
                    ));
                }
                let Some(pack) = self.fonts.get(font) else {
                    error!(widget = %name, font = %font, "font not registered");
                    return Err(MarqueeError::UnknownFont(font.clone()));
                };
                let widget = Text::new(
                    format.clone(),
                    variables.clone(),
                    pack.clone(),
                    self.db.clone(),
                    *varwidth,
                    Size::new(size.0, size.1),
                    (*just).into(),
                );
                (Box::new(widget), effect)
            }
            WidgetDef::Progressbar {
                value,
                rangeval,
                size,
                style,
                effect,
            } => {
                if size.0 == 0 || size.1 == 0 {
                    return Err(MarqueeError::InvalidWidgetSpec(
                        name.to_string(),
                        "progress bar needs a non-empty size".into(),
                    ));
                }
                let widget = ProgressBar::new(
                    value.into(),
                    (&rangeval.0).into(),
                    (&rangeval.1).into(),
                    Size::new(size.0, size.1),
                    (*style).into(),
                    self.db.clone(),
                );
                (Box::new(widget), effect)
            }
            WidgetDef::Line {
                point,
                color,
                effect,
            } => {
                let widget = LineWidget::new(Point::new(point.0, point.1), *color != 0);
                (Box::new(widget), effect)
            }
            WidgetDef::Rectangle {
                point,
                fill,
                outline,
                effect,
            } => {
                let widget =
                    RectangleWidget::new(Point::new(point.0, point.1), *fill != 0, *outline != 0);
                (Box::new(widget), effect)
            }
        };
        Ok(shared_boxed(self.wrap_effect(widget, effect.as_ref())))
    }

    fn wrap_effect(
        &self,
        widget: Box<dyn Widget>,
        effect: Option<&EffectDef>,
    ) -> Box<dyn Widget> {
        match effect {
            None => widget,
            Some(EffectDef::Scroll {
                direction,
                distance,
                gap,
                hesitate,
                hesitate_time,
                threshold,
            }) => Box::new(
                Scroll::new(widget, self.clock.clone())
                    .with_direction((*direction).into())
                    .with_distance(*distance)
                    .with_gap(*gap)
                    .with_hesitate((*hesitate).into(), *hesitate_time)
                    .with_threshold(*threshold),
            ),
            Some(EffectDef::Popup {
                height,
                duration,
                popup_duration,
            }) => Box::new(
                Popup::new(widget, *height, self.clock.clone())
                    .with_duration(*duration)
                    .with_popup_duration(*popup_duration),
            ),
        }
    }

    /// Build canvas `name` (and, recursively, canvases it nests) into
    /// the widget map. Cycles are a build error.
    fn build_canvas(
        &self,
        name: &str,
        page: &PageDef,
        widgets: &mut HashMap<String, WidgetRef>,
        visiting: &mut HashSet<String>,
    ) -> Result<()> {
        if widgets.contains_key(name) {
            return Ok(());
        }
        let Some(def) = page.canvases.get(name) else {
            return Ok(());
        };
        if !visiting.insert(name.to_string()) {
            return Err(MarqueeError::CyclicCanvas(name.to_string()));
        }

        let mut canvas = Canvas::new(Size::new(def.size.0, def.size.1));
        for (child, x, y) in &def.widgets {
            if !widgets.contains_key(child) && page.canvases.contains_key(child) {
                self.build_canvas(child, page, widgets, visiting)?;
            }
            match widgets.get(child) {
                Some(handle) => {
                    canvas.add(handle.clone(), Point::new(*x, *y), Size::new(0, 0));
                }
                None => {
                    warn!(canvas = %name, child = %child, "canvas child not found, skipping");
                }
            }
        }

        visiting.remove(name);
        let wrapped = self.wrap_effect(Box::new(canvas), def.effect.as_ref());
        widgets.insert(name.to_string(), shared_boxed(wrapped));
        Ok(())
    }

    fn build_sequence(
        &self,
        def: &SequenceDef,
        widgets: &HashMap<String, WidgetRef>,
    ) -> Option<Sequence> {
        let conditional = self.conditional_or_never(&def.conditional, &def.name);
        let mut seq = Sequence::new(
            conditional,
            self.db.clone(),
            self.dbp.clone(),
            def.coolingperiod,
            def.minimum,
            Point::new(def.coordinates.0, def.coordinates.1),
            self.clock.clone(),
        );
        for item in &def.canvases {
            if item.duration <= 0.0 {
                warn!(sequence = %def.name, item = %item.name, "item needs a positive duration");
                continue;
            }
            let Some(widget) = widgets.get(&item.name) else {
                warn!(sequence = %def.name, item = %item.name, "item widget not found");
                continue;
            };
            let conditional = self.conditional_or_never(&item.conditional, &item.name);
            seq.add(widget.clone(), item.duration, conditional);
        }
        if seq.is_empty() {
            return None;
        }
        Some(seq)
    }
}
