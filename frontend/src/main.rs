use gloo_file::{File as GlooFile, ObjectUrl};
use gloo_net::http::Request;
use shared::{
    AccuracyReport, CONFIDENCE_THRESHOLD, ClassDistribution, ErrorResponse, HealthResponse,
    PredictionResponse,
};
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys::{DragEvent, FileList, HtmlInputElement};
use yew::prelude::*;

const ACCEPTED_EXTENSIONS: [&str; 3] = [".jpg", ".jpeg", ".png"];

// Models
struct FileData {
    file: GlooFile,
    preview_url: ObjectUrl,
}

// Yew msg components
enum Msg {
    // File operations
    FileSelected(GlooFile),
    RemoveFile,

    // Classification
    Classify,
    Classified(PredictionResponse),

    // Dashboard data
    HealthFetched(HealthResponse),
    DistributionFetched(ClassDistribution),
    AccuracyFetched(AccuracyReport),

    // UI states
    SetError(Option<String>),
    SetDragging(bool),
    HandleDrop(DragEvent),
}

// Main component
struct Model {
    file: Option<FileData>,
    result: Option<PredictionResponse>,
    loading: bool,
    error: Option<String>,
    health: Option<HealthResponse>,
    distribution: Option<ClassDistribution>,
    accuracy: Option<AccuracyReport>,
    is_dragging: bool,
}

fn has_accepted_extension(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    ACCEPTED_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}

impl Component for Model {
    type Message = Msg;
    type Properties = ();

    fn create(ctx: &Context<Self>) -> Self {
        Self::fetch_dashboard(ctx);
        Self {
            file: None,
            result: None,
            loading: false,
            error: None,
            health: None,
            distribution: None,
            accuracy: None,
            is_dragging: false,
        }
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            Msg::FileSelected(file) => self.handle_file_selected(file),
            Msg::RemoveFile => {
                self.file = None;
                self.result = None;
                self.error = None;
                true
            }
            Msg::Classify => self.handle_classify(ctx),
            Msg::Classified(result) => {
                self.result = Some(result);
                self.loading = false;
                true
            }
            Msg::HealthFetched(health) => {
                self.health = Some(health);
                true
            }
            Msg::DistributionFetched(distribution) => {
                self.distribution = Some(distribution);
                true
            }
            Msg::AccuracyFetched(accuracy) => {
                self.accuracy = Some(accuracy);
                true
            }
            Msg::SetError(error) => {
                self.error = error;
                self.loading = false;
                true
            }
            Msg::SetDragging(is_dragging) => {
                self.is_dragging = is_dragging;
                true
            }
            Msg::HandleDrop(event) => self.handle_drop(ctx, event),
        }
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        html! {
            <div class="container">
                { self.render_header() }
                { self.render_health_banner() }

                <main class="main-content">
                    { self.render_upload_section(ctx) }
                    { self.render_error_message() }
                    { self.render_result() }
                    { self.render_dashboard() }
                </main>

                <footer class="app-footer">
                    <p>{"Brain Tumor MRI Classification | Fullstack Rust WASM"}</p>
                </footer>
            </div>
        }
    }
}

// Handler methods
impl Model {
    fn fetch_dashboard(ctx: &Context<Self>) {
        let link = ctx.link().clone();
        spawn_local(async move {
            if let Ok(resp) = Request::get("/health").send().await {
                if let Ok(health) = resp.json::<HealthResponse>().await {
                    link.send_message(Msg::HealthFetched(health));
                }
            }
        });

        let link = ctx.link().clone();
        spawn_local(async move {
            if let Ok(resp) = Request::get("/stats/distribution").send().await {
                if let Ok(distribution) = resp.json::<ClassDistribution>().await {
                    link.send_message(Msg::DistributionFetched(distribution));
                }
            }
        });

        let link = ctx.link().clone();
        spawn_local(async move {
            if let Ok(resp) = Request::get("/stats/accuracy").send().await {
                if let Ok(accuracy) = resp.json::<AccuracyReport>().await {
                    link.send_message(Msg::AccuracyFetched(accuracy));
                }
            }
        });
    }

    fn handle_file_selected(&mut self, file: GlooFile) -> bool {
        if !has_accepted_extension(&file.name()) {
            self.error = Some(format!(
                "Unsupported file \"{}\". Please pick a jpg, jpeg or png image.",
                file.name()
            ));
            return true;
        }
        let preview_url = ObjectUrl::from(file.clone());
        self.file = Some(FileData { file, preview_url });
        self.result = None;
        self.error = None;
        true
    }

    fn handle_classify(&mut self, ctx: &Context<Self>) -> bool {
        let Some(file_data) = &self.file else {
            self.error = Some("No file selected for classification.".to_string());
            return true;
        };
        self.loading = true;
        self.error = None;
        self.send_predict_request(ctx, file_data.file.clone());
        true
    }

    fn handle_drop(&mut self, ctx: &Context<Self>, event: DragEvent) -> bool {
        event.prevent_default();
        self.is_dragging = false;

        if let Some(data_transfer) = event.data_transfer() {
            if let Some(file_list) = data_transfer.files() {
                if let Some(file) = Self::first_file(&file_list) {
                    ctx.link().send_message(Msg::FileSelected(file));
                }
            }
        }
        true
    }

    fn first_file(file_list: &FileList) -> Option<GlooFile> {
        file_list.item(0).map(GlooFile::from)
    }

    fn send_predict_request(&self, ctx: &Context<Self>, file: GlooFile) {
        spawn_local({
            let link = ctx.link().clone();

            async move {
                let form_data = web_sys::FormData::new().unwrap();
                form_data.append_with_blob("image", file.as_ref()).unwrap();

                let request = Request::post("/predict")
                    .body(form_data)
                    .expect("Failed to build request.");

                match request.send().await {
                    Ok(response) => {
                        if response.ok() {
                            match response.json::<PredictionResponse>().await {
                                Ok(result) => link.send_message(Msg::Classified(result)),
                                Err(e) => link.send_message(Msg::SetError(Some(format!(
                                    "Failed to parse response: {}",
                                    e
                                )))),
                            }
                        } else {
                            let message = match response.json::<ErrorResponse>().await {
                                Ok(body) => body.error,
                                Err(_) => format!("Server error: {}", response.status()),
                            };
                            link.send_message(Msg::SetError(Some(message)));
                        }
                    }
                    Err(e) => {
                        link.send_message(Msg::SetError(Some(format!("Network error: {}", e))))
                    }
                }
            }
        });
    }
}

// Rendering methods
impl Model {
    fn render_header(&self) -> Html {
        html! {
            <header class="app-header">
                <h1>{"Brain Tumor MRI Classifier"}</h1>
                <p class="subtitle">{"Select a brain MRI scan to classify"}</p>
            </header>
        }
    }

    fn render_health_banner(&self) -> Html {
        match &self.health {
            Some(health) if !health.model_loaded => html! {
                <div class="error-message">
                    <p>{"The classification model is not loaded; predictions are unavailable."}</p>
                </div>
            },
            _ => html! {},
        }
    }

    fn render_upload_section(&self, ctx: &Context<Self>) -> Html {
        let link = ctx.link();

        let handle_change = link.callback(|e: Event| {
            let input: HtmlInputElement = e.target_unchecked_into();
            let file = input.files().as_ref().and_then(Self::first_file);
            input.set_value("");
            match file {
                Some(file) => Msg::FileSelected(file),
                None => Msg::SetError(Some("No image file selected.".to_string())),
            }
        });

        let handle_drag_over = link.callback(|e: DragEvent| {
            e.prevent_default();
            Msg::SetDragging(true)
        });
        let handle_drag_leave = link.callback(|e: DragEvent| {
            e.prevent_default();
            Msg::SetDragging(false)
        });
        let handle_drop = link.callback(Msg::HandleDrop);

        let trigger_file_input = Callback::from(|_| {
            if let Some(input) = web_sys::window()
                .unwrap()
                .document()
                .unwrap()
                .get_element_by_id("file-input")
            {
                if let Ok(html_input) = input.dyn_into::<web_sys::HtmlElement>() {
                    html_input.click();
                }
            }
        });

        html! {
            <div class="upload-section">
                <input
                    type="file"
                    id="file-input"
                    accept=".jpg,.jpeg,.png"
                    style="display: none;"
                    onchange={handle_change}
                />
                <div
                    id="drop-zone"
                    class={classes!("upload-area", self.is_dragging.then_some("drag-over"))}
                    ondragover={handle_drag_over}
                    ondragleave={handle_drag_leave}
                    ondrop={handle_drop}
                    onclick={trigger_file_input}
                >
                    <div class="upload-placeholder">
                        <p>{"Drag & drop an MRI scan here, or click to browse"}</p>
                        <p class="file-types">{"Supported formats: JPG, JPEG, PNG"}</p>
                    </div>
                </div>
                { self.render_preview(ctx) }
            </div>
        }
    }

    fn render_preview(&self, ctx: &Context<Self>) -> Html {
        let Some(file_data) = &self.file else {
            return html! {};
        };
        let link = ctx.link();

        html! {
            <div id="preview-container">
                <img
                    id="image-preview"
                    src={file_data.preview_url.to_string()}
                    alt={file_data.file.name()}
                    style="max-width: 100%; max-height: 400px; object-fit: contain; margin-bottom: 10px;"
                />
                <div class="button-container">
                    <button
                        class="analyze-btn"
                        onclick={link.callback(|_| Msg::Classify)}
                        disabled={self.loading}
                    >
                        { if self.loading { "Classifying..." } else { "Classify Scan" } }
                    </button>
                    <button
                        class="analyze-btn"
                        style="background-color: var(--danger-color);"
                        onclick={link.callback(|_| Msg::RemoveFile)}
                    >
                        {"Clear"}
                    </button>
                </div>
            </div>
        }
    }

    fn render_error_message(&self) -> Html {
        if let Some(error_msg) = &self.error {
            html! {
                <div class="error-message">
                    <p>{ error_msg }</p>
                </div>
            }
        } else {
            html! {}
        }
    }

    fn render_result(&self) -> Html {
        let Some(result) = &self.result else {
            return html! {};
        };

        let confident = result.confidence >= CONFIDENCE_THRESHOLD;
        // green when confident, orange when the model is unsure
        let tone = if confident { "#2e7d32" } else { "#e65100" };

        html! {
            <div class={classes!("results-container", if confident { "confident" } else { "uncertain" })}>
                <div class="result-header">
                    <h2 style={format!("color: {};", tone)}>
                        { format!("Prediction: {}", result.class) }
                    </h2>
                    <div class="confidence-meter">
                        <div class="meter-label">{"Confidence:"}</div>
                        <div class="meter">
                            <div
                                class="meter-fill"
                                style={format!("width: {}%; background-color: {};", result.confidence * 100.0, tone)}
                            ></div>
                        </div>
                        <div class="meter-value">{ format!("{:.2}", result.confidence) }</div>
                    </div>
                </div>
                <div class="detailed-results">
                    <h3>{"Class confidences"}</h3>
                    <div class="result-bars">
                        { for result.class_confidences.iter().map(|(label, &confidence)| {
                            let is_top = *label == result.class;
                            html! {
                                <div class="result-item">
                                    <div class="result-label" style={is_top.then_some("font-weight: bold;")}>
                                        { label.clone() }{ if is_top { " *" } else { "" } }
                                    </div>
                                    <div class="result-bar-container">
                                        <div class="result-bar" style={format!("width: {}%", confidence * 100.0)}></div>
                                    </div>
                                    <div class="result-value">{ format!("{:.4}", confidence) }</div>
                                </div>
                            }
                        })}
                    </div>
                </div>
            </div>
        }
    }

    fn render_dashboard(&self) -> Html {
        if self.distribution.is_none() && self.accuracy.is_none() {
            return html! {};
        }

        html! {
            <div class="dashboard">
                {
                    if let Some(distribution) = &self.distribution {
                        let total: u32 = distribution.values().sum();
                        html! {
                            <div class="dashboard-panel">
                                <h3>{"Training class distribution"}</h3>
                                { for distribution.iter().map(|(label, &count)| {
                                    let percentage = if total > 0 { count as f32 * 100.0 / total as f32 } else { 0.0 };
                                    html! {
                                        <div class="result-item">
                                            <div class="result-label">{ label.clone() }</div>
                                            <div class="result-bar-container">
                                                <div class="result-bar" style={format!("width: {}%", percentage)}></div>
                                            </div>
                                            <div class="result-value">{ count }</div>
                                        </div>
                                    }
                                })}
                            </div>
                        }
                    } else {
                        html! {}
                    }
                }
                {
                    if let Some(accuracy) = &self.accuracy {
                        html! {
                            <div class="dashboard-panel">
                                <h3>{ format!("Model accuracy: {:.0}%", accuracy.overall_accuracy * 100.0) }</h3>
                                { for accuracy.class_accuracy.iter().map(|(label, &value)| html! {
                                    <div class="result-item">
                                        <div class="result-label">{ label.clone() }</div>
                                        <div class="result-value">{ format!("{:.0}%", value * 100.0) }</div>
                                    </div>
                                })}
                            </div>
                        }
                    } else {
                        html! {}
                    }
                }
            </div>
        }
    }
}

fn main() {
    wasm_logger::init(wasm_logger::Config::default());
    log::info!("App starting...");
    yew::Renderer::<Model>::new().render();
}
