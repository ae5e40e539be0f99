use iced::{
    mouse, time,
    widget::{
        button,
        canvas::{self, Canvas, Frame, Geometry, Path, Stroke},
        column, image, pick_list, progress_bar, row, scrollable, text, Column, Container,
    },
    Alignment, Color, Element, Length, Point, Rectangle, Renderer, Subscription, Task, Theme,
};
use serde::Deserialize;
use std::time::Duration;
use stubblecore::session::view::{DetectionPanel, HistoryPanel, ImagePanel, MapMarker};
use stubblecore::session::{Action, DashboardView, Notice, NoticeLevel};

/// Rough lat/lon bounds of Punjab used to place markers on the canvas.
const LAT_RANGE: (f64, f64) = (29.5, 32.6);
const LON_RANGE: (f64, f64) = (73.8, 77.0);

fn main() -> iced::Result {
    iced::application(Dashboard::boot, Dashboard::update, Dashboard::view)
        .title(application_title)
        .subscription(application_subscription)
        .theme(application_theme)
        .run()
}

fn application_title(_: &Dashboard) -> String {
    "Stubble Fire Dashboard".into()
}

fn application_subscription(state: &Dashboard) -> Subscription<Message> {
    // Keep retrying until the bridge hands out a session.
    if state.session.is_none() {
        time::every(Duration::from_secs(2)).map(|_| Message::Retry)
    } else {
        Subscription::none()
    }
}

fn application_theme(_: &Dashboard) -> Theme {
    Theme::Dark
}

fn bridge_url() -> String {
    std::env::var("STUBBLE_BRIDGE_URL").unwrap_or_else(|_| "http://127.0.0.1:9000".into())
}

#[derive(Debug)]
struct Dashboard {
    session: Option<u64>,
    view: Option<DashboardView>,
    status: String,
    pending: bool,
}

#[derive(Debug, Clone)]
enum Message {
    Retry,
    SessionStarted(Result<SessionCreated, String>),
    DistrictSelected(String),
    CheckFireActivity,
    ViewHistory,
    HideHistory,
    NotifyAuthorities,
    NewSession,
    ViewFetched(Result<DashboardView, String>),
}

impl Dashboard {
    fn boot() -> (Self, Task<Message>) {
        (
            Dashboard {
                session: None,
                view: None,
                status: "Connecting to dashboard bridge...".into(),
                pending: true,
            },
            Task::perform(create_session(), Message::SessionStarted),
        )
    }

    fn update(state: &mut Self, message: Message) -> Task<Message> {
        match message {
            Message::Retry => {
                if state.pending {
                    return Task::none();
                }
                state.pending = true;
                Task::perform(create_session(), Message::SessionStarted)
            }
            Message::SessionStarted(Ok(created)) => {
                state.pending = false;
                state.session = Some(created.id);
                state.status = format!("Session {} ready", created.id);
                state.view = Some(created.view);
                Task::none()
            }
            Message::SessionStarted(Err(err)) => {
                state.pending = false;
                state.status = format!("Bridge unavailable: {err}");
                Task::none()
            }
            Message::DistrictSelected(district) => {
                state.dispatch(Action::SelectDistrict(district))
            }
            Message::CheckFireActivity => state.dispatch(Action::CheckFireActivity),
            Message::ViewHistory => state.dispatch(Action::ViewHistory),
            Message::HideHistory => state.dispatch(Action::HideHistory),
            Message::NotifyAuthorities => state.dispatch(Action::NotifyAuthorities),
            Message::NewSession => match state.session.take() {
                Some(id) if !state.pending => {
                    state.pending = true;
                    state.status = format!("Ending session {id}...");
                    Task::perform(replace_session(id), Message::SessionStarted)
                }
                previous => {
                    state.session = previous;
                    Task::none()
                }
            },
            Message::ViewFetched(Ok(view)) => {
                state.pending = false;
                state.status = format!("Showing {}", view.selected);
                state.view = Some(view);
                Task::none()
            }
            Message::ViewFetched(Err(err)) => {
                state.pending = false;
                state.status = format!("Action failed: {err}");
                Task::none()
            }
        }
    }

    /// One action in flight at a time, so replies cannot arrive out of order.
    fn can_dispatch(&self) -> bool {
        self.session.is_some() && !self.pending
    }

    fn dispatch(&mut self, action: Action) -> Task<Message> {
        match self.session {
            Some(id) if !self.pending => {
                self.pending = true;
                Task::perform(post_action(id, action), Message::ViewFetched)
            }
            _ => Task::none(),
        }
    }

    fn view(state: &Self) -> Element<'_, Message> {
        let Some(view) = &state.view else {
            return Container::new(text(&state.status).size(18))
                .width(Length::Fill)
                .height(Length::Fill)
                .center_x(Length::Fill)
                .center_y(Length::Fill)
                .into();
        };

        let ready = state.can_dispatch();
        let controls = column![
            text(&view.title).size(26),
            text(&view.caption).size(14),
            text("Select District:").size(16),
            pick_list(
                view.districts.clone(),
                Some(view.selected.clone()),
                Message::DistrictSelected
            ),
            row![
                button("Check Fire Activity")
                    .on_press_maybe(ready.then_some(Message::CheckFireActivity))
                    .padding(10),
                history_button(view.history.is_some(), ready),
            ]
            .spacing(10),
            button("Notify Authorities")
                .on_press_maybe(
                    (ready && view.notify_enabled).then_some(Message::NotifyAuthorities)
                )
                .padding(10),
            button("New Session")
                .on_press_maybe(ready.then_some(Message::NewSession))
                .padding(6),
            notices_column(&view.notices),
            text(&state.status).size(12),
        ]
        .spacing(12)
        .padding(16)
        .width(Length::Fixed(380.0));

        let mut results = Column::new().spacing(10).padding(16).width(Length::Fill);
        if let Some(metrics) = &view.metrics {
            results = results
                .push(text("AI Confidence").size(16))
                .push(text(format!("{}%", metrics.confidence_pct)).size(32))
                .push(text(metrics.aqi_summary()).size(16));
        }
        if let Some(panel) = &view.detection {
            results = results.push(detection_column(panel));
        }
        if let Some(history) = &view.history {
            results = results.push(history_column(history));
        }

        let layout = row![controls, scrollable(results)]
            .spacing(20)
            .align_y(Alignment::Start)
            .padding(20);

        Container::new(layout)
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }
}

fn history_button<'a>(visible: bool, enabled: bool) -> Element<'a, Message> {
    let (label, message) = if visible {
        ("Hide Alert History", Message::HideHistory)
    } else {
        ("View Alert History", Message::ViewHistory)
    };
    button(label)
        .on_press_maybe(enabled.then_some(message))
        .padding(10)
        .into()
}

fn notice_color(level: NoticeLevel) -> Color {
    match level {
        NoticeLevel::Success => Color::from_rgb(0.3, 0.8, 0.4),
        NoticeLevel::Info => Color::from_rgb(0.4, 0.6, 0.95),
        NoticeLevel::Warning => Color::from_rgb(0.95, 0.7, 0.2),
    }
}

fn notices_column<'a>(notices: &[Notice]) -> Column<'a, Message> {
    notices.iter().fold(Column::new().spacing(4), |col, notice| {
        col.push(
            text(notice.message.clone())
                .size(14)
                .color(notice_color(notice.level)),
        )
    })
}

fn image_element<'a>(panel: &Option<ImagePanel>) -> Column<'a, Message> {
    match panel {
        Some(panel) => column![
            image(image::Handle::from_path(&panel.path)).width(Length::Fixed(panel.width as f32)),
            text(panel.caption.clone()).size(12),
        ]
        .spacing(4),
        None => Column::new(),
    }
}

fn detection_column<'a>(panel: &DetectionPanel) -> Column<'a, Message> {
    match panel {
        DetectionPanel::Fire {
            headline,
            time,
            location,
            progress,
            marker,
            image,
            status,
        } => column![
            text(headline.clone())
                .size(20)
                .color(Color::from_rgb(0.95, 0.35, 0.25)),
            text(format!("Time: {time} | {location}")).size(14),
            progress_bar(0.0..=100.0, *progress as f32),
            Canvas::new(DistrictMap {
                marker: Some(marker.clone()),
            })
            .width(Length::Fixed(700.0))
            .height(Length::Fixed(400.0)),
            image_element(image),
            text(status.clone())
                .size(14)
                .color(notice_color(NoticeLevel::Success)),
        ]
        .spacing(10),
        DetectionPanel::Clear {
            headline,
            last_scan,
            image,
        } => column![
            text(headline.clone())
                .size(20)
                .color(notice_color(NoticeLevel::Success)),
            text(format!("Last scan: {last_scan}")).size(14),
            image_element(image),
        ]
        .spacing(10),
    }
}

fn history_column<'a>(history: &HistoryPanel) -> Column<'a, Message> {
    column![
        text("Alert history").size(16),
        Container::new(scrollable(text(history.alerts.clone()).size(12)).height(Length::Fixed(160.0)))
            .padding(6),
        text("Emergency notifications").size(16),
        Container::new(
            scrollable(text(history.emergencies.clone()).size(12)).height(Length::Fixed(100.0))
        )
        .padding(6),
    ]
    .spacing(6)
}

#[derive(Debug, Clone, Deserialize)]
struct SessionCreated {
    id: u64,
    view: DashboardView,
}

async fn create_session() -> Result<SessionCreated, String> {
    let client = reqwest::Client::new();
    let response = client
        .post(format!("{}/session", bridge_url()))
        .send()
        .await
        .map_err(|e| e.to_string())?;
    read_json(response).await
}

/// Ends `previous` on the bridge, then opens a fresh session.
async fn replace_session(previous: u64) -> Result<SessionCreated, String> {
    let client = reqwest::Client::new();
    let response = client
        .delete(format!("{}/session/{}", bridge_url(), previous))
        .send()
        .await
        .map_err(|e| e.to_string())?;
    // An unknown session was already discarded server-side.
    if !response.status().is_success() && response.status() != reqwest::StatusCode::NOT_FOUND {
        return Err(format!("ending session {previous}: {}", response.status()));
    }
    create_session().await
}

async fn post_action(id: u64, action: Action) -> Result<DashboardView, String> {
    let client = reqwest::Client::new();
    let response = client
        .post(format!("{}/session/{}/action", bridge_url(), id))
        .json(&action)
        .send()
        .await
        .map_err(|e| e.to_string())?;
    read_json(response).await
}

async fn read_json<T: serde::de::DeserializeOwned>(response: reqwest::Response) -> Result<T, String> {
    if response.status().is_success() {
        response.json::<T>().await.map_err(|e| e.to_string())
    } else {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .and_then(|value| value["error"].as_str().map(str::to_string))
            .unwrap_or(body);
        Err(format!("{}: {}", status, message))
    }
}

/// Canvas sketch of the Punjab bounding box with the fire marker.
#[derive(Clone)]
struct DistrictMap {
    marker: Option<MapMarker>,
}

fn project(lat: f64, lon: f64, bounds: Rectangle, margin: f32) -> Point {
    let x = ((lon - LON_RANGE.0) / (LON_RANGE.1 - LON_RANGE.0)).clamp(0.0, 1.0) as f32;
    let y = ((lat - LAT_RANGE.0) / (LAT_RANGE.1 - LAT_RANGE.0)).clamp(0.0, 1.0) as f32;
    let width = bounds.width - 2.0 * margin;
    let height = bounds.height - 2.0 * margin;
    Point::new(margin + x * width, margin + (1.0 - y) * height)
}

impl canvas::Program<Message> for DistrictMap {
    type State = ();

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<Geometry> {
        let mut frame = Frame::new(renderer, bounds.size());
        frame.fill_rectangle(
            Point::ORIGIN,
            bounds.size(),
            Color::from_rgb(0.06, 0.09, 0.06),
        );

        let margin = 16.0;
        let grid = Path::new(|builder| {
            for step in 0..=6 {
                let lat = LAT_RANGE.0 + (LAT_RANGE.1 - LAT_RANGE.0) * step as f64 / 6.0;
                let lon = LON_RANGE.0 + (LON_RANGE.1 - LON_RANGE.0) * step as f64 / 6.0;
                builder.move_to(project(lat, LON_RANGE.0, bounds, margin));
                builder.line_to(project(lat, LON_RANGE.1, bounds, margin));
                builder.move_to(project(LAT_RANGE.0, lon, bounds, margin));
                builder.line_to(project(LAT_RANGE.1, lon, bounds, margin));
            }
        });
        frame.stroke(
            &grid,
            Stroke::default()
                .with_color(Color::from_rgb(0.2, 0.28, 0.2))
                .with_width(1.0),
        );

        if let Some(marker) = &self.marker {
            let center = project(marker.lat, marker.lon, bounds, margin);
            let radius = 4.0 + f32::from(marker.zoom);
            let halo = Path::new(|builder| builder.circle(center, radius * 2.0));
            frame.fill(&halo, Color::from_rgba(0.95, 0.25, 0.15, 0.25));
            let dot = Path::new(|builder| builder.circle(center, radius));
            frame.fill(&dot, Color::from_rgb(0.95, 0.2, 0.1));
            frame.fill_text(canvas::Text {
                content: format!("{} ({:.2}, {:.2})", marker.popup, marker.lat, marker.lon),
                position: Point::new(center.x + radius * 2.0 + 4.0, center.y - 6.0),
                color: Color::WHITE,
                ..canvas::Text::default()
            });
        }

        vec![frame.into_geometry()]
    }
}
