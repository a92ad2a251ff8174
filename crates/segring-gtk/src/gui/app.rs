use crate::events::AppEvent;
use crate::gui::ring;
use crate::gui::theme::ThemeColors;
use gdk_pixbuf::Pixbuf;
use gtk::glib::SignalHandlerId;
use gtk::prelude::*;
use gtk4 as gtk;
use relm4::prelude::*;
use segring::{Parameter, ProgressStore, RingParameters, Subscription, UiState};
use std::sync::Arc;
use strum::IntoEnumIterator;

// slider values closer than this are considered in sync with the store
const SLIDER_EPSILON: f64 = 1e-6;

pub struct AppModel {
    pub store: Arc<ProgressStore>,
    pub snapshot: Arc<UiState>,
    pub drawing_area: gtk::DrawingArea,
    parameter_sliders: Vec<(Parameter, SyncedScale)>,
    pub segment_box: gtk::Box,
    segment_sliders: Vec<SyncedScale>,
    total_slider: Option<SyncedScale>,
    _subscription: Subscription,
}

/// A slider whose change handler is muted while the store's value is pushed into it,
/// so clamping by the slider's range never writes back into the store.
struct SyncedScale {
    scale: gtk::Scale,
    handler: SignalHandlerId,
}

impl SyncedScale {
    fn connect(scale: gtk::Scale, on_change: impl Fn(f64) + 'static) -> Self {
        let handler = scale.connect_value_changed(move |scale| on_change(scale.value()));
        Self { scale, handler }
    }

    fn quietly(&self, f: impl FnOnce(&gtk::Scale)) {
        self.scale.block_signal(&self.handler);
        f(&self.scale);
        self.scale.unblock_signal(&self.handler);
    }

    fn show(&self, value: f64) {
        if (self.scale.value() - value).abs() > SLIDER_EPSILON {
            self.quietly(|scale| scale.set_value(value));
        }
    }

    fn set_upper(&self, upper: f64) {
        if (self.scale.adjustment().upper() - upper).abs() > SLIDER_EPSILON {
            self.quietly(|scale| scale.set_range(0.0, upper));
        }
    }
}

#[derive(Debug)]
pub enum AppMsg {
    AddSegment,
    SetSegment(usize, f64),
    SetTotal(f64),
    SetAggregateMode(bool),
    SetParameter(Parameter, f64),
    StateChanged,
    ConfigReload(RingParameters),
}

impl From<AppEvent> for AppMsg {
    fn from(event: AppEvent) -> Self {
        match event {
            AppEvent::StateChanged => AppMsg::StateChanged,
            AppEvent::ConfigReload(parameters) => AppMsg::ConfigReload(parameters),
        }
    }
}

#[relm4::component(pub)]
impl SimpleComponent for AppModel {
    type Init = (
        Arc<ProgressStore>,
        Option<Pixbuf>,
        async_channel::Sender<AppEvent>,
        async_channel::Receiver<AppEvent>,
    );
    type Input = AppMsg;
    type Output = ();

    view! {
        #[root]
        #[name = "window"]
        gtk::ApplicationWindow {
            set_title: Some("Segmented Progress Ring"),
            set_default_width: 420,
            set_default_height: 780,

            gtk::Box {
                set_orientation: gtk::Orientation::Vertical,
                set_spacing: 8,
                set_margin_top: 16,
                set_margin_bottom: 16,
                set_margin_start: 16,
                set_margin_end: 16,

                #[name = "drawing_area"]
                gtk::DrawingArea {
                    set_hexpand: true,
                    set_vexpand: true,
                    set_content_height: 300,
                },

                gtk::Button {
                    set_label: "Add Segment",
                    set_halign: gtk::Align::Center,
                    connect_clicked[sender] => move |_| {
                        sender.input(AppMsg::AddSegment);
                    }
                },

                #[name = "parameter_grid"]
                gtk::Grid {
                    set_row_spacing: 4,
                    set_column_spacing: 12,
                },

                gtk::CheckButton {
                    set_label: Some("Control all segments with one slider"),
                    set_active: model.snapshot.aggregate_mode,
                    connect_toggled[sender] => move |button| {
                        sender.input(AppMsg::SetAggregateMode(button.is_active()));
                    }
                },

                #[name = "total_slider"]
                gtk::Scale {
                    set_orientation: gtk::Orientation::Horizontal,
                    set_hexpand: true,
                    set_digits: 2,
                    set_draw_value: true,
                    #[watch]
                    set_visible: model.snapshot.aggregate_mode && !model.snapshot.progress.is_empty(),
                },

                gtk::ScrolledWindow {
                    set_vexpand: true,
                    set_hscrollbar_policy: gtk::PolicyType::Never,
                    #[watch]
                    set_visible: !model.snapshot.aggregate_mode,

                    #[name = "segment_box"]
                    gtk::Box {
                        set_orientation: gtk::Orientation::Vertical,
                        set_spacing: 4,
                    }
                }
            }
        }
    }

    fn init(
        init: Self::Init,
        root: Self::Root,
        sender: ComponentSender<Self>,
    ) -> ComponentParts<Self> {
        let (store, avatar, tx, rx) = init;

        let subscription = store.subscribe(move |_| {
            let _ = tx.try_send(AppEvent::StateChanged);
        });

        let model = AppModel {
            store: store.clone(),
            snapshot: store.snapshot(),
            drawing_area: gtk::DrawingArea::default(),
            parameter_sliders: Vec::new(),
            segment_box: gtk::Box::default(),
            segment_sliders: Vec::new(),
            total_slider: None,
            _subscription: subscription,
        };

        let widgets = view_output!();

        let mut model = model;
        model.drawing_area = widgets.drawing_area.clone();
        model.segment_box = widgets.segment_box.clone();
        model.total_slider = Some(SyncedScale::connect(widgets.total_slider.clone(), {
            let sender = sender.clone();
            move |value| sender.input(AppMsg::SetTotal(value))
        }));
        model.parameter_sliders =
            build_parameter_sliders(&widgets.parameter_grid, &model.snapshot, &sender);
        model.sync_controls(&sender);

        let store_draw = store.clone();
        widgets
            .drawing_area
            .set_draw_func(move |drawing_area, cr, width, height| {
                let style_context = drawing_area.style_context();
                let colors = ThemeColors::from_context(&style_context);
                if let Err(e) = ring::draw(
                    cr,
                    &store_draw.snapshot(),
                    &colors,
                    avatar.as_ref(),
                    width as f64,
                    height as f64,
                ) {
                    log::error!("Drawing error: {}", e);
                }
            });

        let sender_clone = sender.clone();
        relm4::spawn(async move {
            while let Ok(event) = rx.recv().await {
                sender_clone.input(AppMsg::from(event));
            }
        });

        ComponentParts { model, widgets }
    }

    fn update(&mut self, msg: Self::Input, sender: ComponentSender<Self>) {
        match msg {
            AppMsg::AddSegment => self.store.add_segment(),
            AppMsg::SetSegment(index, value) => {
                if let Err(e) = self.store.set_segment(index, value) {
                    log::error!("Slider out of sync with store: {}", e);
                }
            }
            AppMsg::SetTotal(value) => self.store.set_aggregate_progress(value),
            AppMsg::SetAggregateMode(enabled) => self.store.set_aggregate_mode(enabled),
            AppMsg::SetParameter(which, value) => self.store.set_parameter(which, value),
            AppMsg::StateChanged => {
                // events may lag behind the store; always render the newest snapshot
                self.snapshot = self.store.snapshot();
                self.sync_controls(&sender);
                self.drawing_area.queue_draw();
            }
            AppMsg::ConfigReload(parameters) => {
                self.store.set_parameters(parameters);
                log::info!("Configuration reloaded");
            }
        }
    }
}

impl AppModel {
    /// Brings every slider in line with the current snapshot, adding sliders for new segments.
    fn sync_controls(&mut self, sender: &ComponentSender<Self>) {
        let state = self.snapshot.clone();

        for (which, slider) in &self.parameter_sliders {
            slider.show(state.parameters.get(*which));
        }

        while self.segment_sliders.len() < state.segment_count() {
            let slider = segment_slider(self.segment_sliders.len(), sender);
            self.segment_box.append(&slider.scale);
            self.segment_sliders.push(slider);
        }
        while self.segment_sliders.len() > state.segment_count() {
            if let Some(slider) = self.segment_sliders.pop() {
                self.segment_box.remove(&slider.scale);
            }
        }
        for (slider, progress) in self.segment_sliders.iter().zip(&state.progress) {
            slider.show(**progress);
        }

        if let Some(total) = &self.total_slider {
            total.set_upper(state.segment_count().max(1) as f64);
            total.show(state.total_progress);
        }
    }
}

fn segment_slider(index: usize, sender: &ComponentSender<AppModel>) -> SyncedScale {
    let scale = gtk::Scale::with_range(gtk::Orientation::Horizontal, 0.0, 1.0, 0.01);
    scale.set_hexpand(true);
    scale.set_digits(2);
    scale.set_draw_value(true);

    let sender = sender.clone();
    SyncedScale::connect(scale, move |value| {
        sender.input(AppMsg::SetSegment(index, value))
    })
}

fn build_parameter_sliders(
    grid: &gtk::Grid,
    state: &UiState,
    sender: &ComponentSender<AppModel>,
) -> Vec<(Parameter, SyncedScale)> {
    Parameter::iter()
        .enumerate()
        .map(|(row, which)| {
            let bounds = which.bounds();
            let label = gtk::Label::new(Some(which.label()));
            label.set_halign(gtk::Align::Start);

            let scale = gtk::Scale::with_range(
                gtk::Orientation::Horizontal,
                *bounds.start(),
                *bounds.end(),
                1.0,
            );
            scale.set_hexpand(true);
            scale.set_digits(0);
            scale.set_draw_value(true);
            scale.set_value(state.parameters.get(which));

            grid.attach(&label, 0, row as i32, 1, 1);
            grid.attach(&scale, 1, row as i32, 1, 1);

            let sender = sender.clone();
            let slider = SyncedScale::connect(scale, move |value| {
                sender.input(AppMsg::SetParameter(which, value))
            });
            (which, slider)
        })
        .collect()
}
