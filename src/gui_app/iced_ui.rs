use iced::widget::{Column, button, column, container, row, scrollable, text, text_input};
use iced::{Color, ContentFit, Element, Length, Size, Task};
use image::{DynamicImage, RgbImage};
use rfd::{AsyncFileDialog, AsyncMessageDialog, MessageButtons, MessageLevel};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

use crate::catalog::{self, CatalogEntry};
use crate::collage::{self, CollageOptions, CollageRequest};
use crate::gui_app::state::ImageSelection;

pub fn run_iced_app() -> iced::Result {
    iced::application(CollageApp::new, CollageApp::update, CollageApp::view)
        .title("Satellite Collage")
        .window_size(Size::new(1100.0, 760.0))
        .run()
}

struct CollageApp {
    folder: Option<PathBuf>,
    selection: ImageSelection,
    sat_model: String,
    orbit: String,
    status_text: String,
    is_busy: bool,
    options: CollageOptions,
    result: Option<BuiltCollage>,
}

#[derive(Debug, Clone)]
enum Message {
    ChooseFolderPressed,
    FolderPicked(Option<PathBuf>),
    CatalogLoaded(Result<Vec<CatalogEntry>, String>),
    SatModelChanged(String),
    OrbitChanged(String),
    EntryToggled(usize),
    CreatePressed,
    CollageBuilt(Result<BuiltCollage, String>),
    SavePressed,
    SavePicked(Option<PathBuf>),
    Saved(Result<PathBuf, String>),
    DialogClosed,
}

#[derive(Debug, Clone)]
struct BuiltCollage {
    title: String,
    image: Arc<RgbImage>,
    handle: iced::widget::image::Handle,
}

#[derive(Debug, Clone, Copy)]
enum Severity {
    Warning,
    Error,
}

impl CollageApp {
    fn new() -> (Self, Task<Message>) {
        (
            CollageApp {
                folder: None,
                selection: ImageSelection::default(),
                sat_model: String::new(),
                orbit: String::new(),
                status_text: "Choose a folder with satellite images".to_string(),
                is_busy: false,
                options: CollageOptions::default(),
                result: None,
            },
            Task::none(),
        )
    }

    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::ChooseFolderPressed => {
                if self.is_busy {
                    return Task::none();
                }
                let dialog = AsyncFileDialog::new()
                    .set_title("Choose a folder with images")
                    .pick_folder();
                Task::perform(dialog, |result| {
                    Message::FolderPicked(result.map(|folder| folder.path().to_path_buf()))
                })
            }
            Message::FolderPicked(Some(folder)) => {
                self.is_busy = true;
                self.status_text = format!("Reading {}", folder.display());
                self.folder = Some(folder.clone());
                Task::perform(load_catalog_task(folder), Message::CatalogLoaded)
            }
            Message::FolderPicked(None) => Task::none(),
            Message::CatalogLoaded(Ok(entries)) => {
                self.is_busy = false;
                let found = entries.len();
                match self.selection.set_entries(entries) {
                    Ok(()) => {
                        self.status_text = format!("{found} images found. Select 4.");
                        Task::none()
                    }
                    Err(err) => self.report(Severity::Error, "Not enough images", err.to_string()),
                }
            }
            Message::CatalogLoaded(Err(err)) => {
                self.is_busy = false;
                self.report(Severity::Error, "Cannot read folder", err)
            }
            Message::SatModelChanged(value) => {
                self.sat_model = value;
                Task::none()
            }
            Message::OrbitChanged(value) => {
                self.orbit = value;
                Task::none()
            }
            Message::EntryToggled(index) => {
                self.selection.toggle(index);
                Task::none()
            }
            Message::CreatePressed => {
                if self.is_busy {
                    return Task::none();
                }
                let inputs = match self.selection.collage_inputs() {
                    Ok(inputs) => inputs,
                    Err(err) => return self.report(Severity::Warning, "Selection", err.to_string()),
                };
                self.is_busy = true;
                self.status_text = "Building collage...".to_string();
                let request = CollageRequest::new(inputs, self.sat_model.clone(), self.orbit.clone());
                Task::perform(
                    build_collage_task(request, self.options.clone()),
                    Message::CollageBuilt,
                )
            }
            Message::CollageBuilt(Ok(built)) => {
                self.is_busy = false;
                self.status_text = format!("Collage ready ({}x{})", built.image.width(), built.image.height());
                self.result = Some(built);
                Task::none()
            }
            Message::CollageBuilt(Err(err)) => {
                self.is_busy = false;
                self.report(Severity::Error, "Something went wrong", err)
            }
            Message::SavePressed => {
                if self.result.is_none() {
                    return Task::none();
                }
                let mut dialog = AsyncFileDialog::new()
                    .add_filter("Images", &["jpg", "png", "tif"])
                    .set_file_name("collage.jpg");
                if let Some(folder) = &self.folder {
                    dialog = dialog.set_directory(folder);
                }
                Task::perform(dialog.save_file(), |result| {
                    Message::SavePicked(result.map(|file| file.path().to_path_buf()))
                })
            }
            Message::SavePicked(Some(path)) => match &self.result {
                Some(built) => Task::perform(save_collage_task(built.image.clone(), path), Message::Saved),
                None => Task::none(),
            },
            Message::SavePicked(None) => Task::none(),
            Message::Saved(Ok(path)) => {
                self.status_text = format!("Saved {}", path.display());
                Task::none()
            }
            Message::Saved(Err(err)) => self.report(Severity::Error, "Save failed", err),
            Message::DialogClosed => Task::none(),
        }
    }

    /// Shows `description` in the status line and in a blocking message box.
    fn report(&mut self, severity: Severity, title: &str, description: String) -> Task<Message> {
        let level = match severity {
            Severity::Warning => MessageLevel::Warning,
            Severity::Error => {
                error!("{title}: {description}");
                MessageLevel::Error
            }
        };
        self.status_text = description.clone();
        let dialog = AsyncMessageDialog::new()
            .set_level(level)
            .set_title(title)
            .set_description(description)
            .set_buttons(MessageButtons::Ok)
            .show();
        Task::perform(dialog, |_| Message::DialogClosed)
    }

    fn view(&self) -> Element<'_, Message> {
        let content = row![self.controls_section(), self.result_section()]
            .spacing(16)
            .height(Length::Fill);

        container(content)
            .width(Length::Fill)
            .height(Length::Fill)
            .padding(16)
            .into()
    }

    fn controls_section(&self) -> Element<'_, Message> {
        let folder_button = if self.is_busy {
            button(text("Working...")).width(Length::Fill)
        } else {
            button(text("Choose folder"))
                .on_press(Message::ChooseFolderPressed)
                .width(Length::Fill)
        };

        let folder_label = text(match &self.folder {
            Some(folder) => folder.display().to_string(),
            None => "No folder chosen".to_string(),
        })
        .size(12);

        let sat_model = text_input("Satellite model", &self.sat_model)
            .on_input(Message::SatModelChanged)
            .padding(6);
        let orbit = text_input("Orbit type (e.g. polar, geostationary)", &self.orbit)
            .on_input(Message::OrbitChanged)
            .padding(6);

        let rows: Vec<Element<'_, Message>> = self
            .selection
            .entries()
            .iter()
            .enumerate()
            .map(|(index, entry)| {
                let selected = self.selection.is_selected(index);
                let marker = if selected { "[x]" } else { "[ ]" };
                button(text(format!("{marker} {}", entry.display_line())).size(12))
                    .on_press(Message::EntryToggled(index))
                    .width(Length::Fill)
                    .style(if selected { button::primary } else { button::secondary })
                    .into()
            })
            .collect();

        let list = scrollable(Column::with_children(rows).spacing(2)).height(Length::Fill);

        let create_button = button(text(format!(
            "Create collage ({}/4 selected)",
            self.selection.selected_count()
        )))
        .on_press_maybe((!self.is_busy).then_some(Message::CreatePressed))
        .width(Length::Fill);

        let status = text(&self.status_text).size(12);

        column![
            folder_button,
            folder_label,
            sat_model,
            orbit,
            text("Select exactly 4 images").size(14),
            list,
            create_button,
            status,
        ]
        .spacing(10)
        .width(Length::FillPortion(2))
        .into()
    }

    fn result_section(&self) -> Element<'_, Message> {
        let Some(built) = &self.result else {
            return container(text("The collage will appear here").size(14))
                .center_x(Length::FillPortion(3))
                .center_y(Length::Fill)
                .style(|_| container::Style {
                    background: Some(Color::from_rgb8(24, 24, 24).into()),
                    ..Default::default()
                })
                .into();
        };

        let picture = iced::widget::image(built.handle.clone())
            .content_fit(ContentFit::Contain)
            .width(Length::Fill)
            .height(Length::Fill);

        let save_button = button(text("Save collage")).on_press(Message::SavePressed);

        column![text(&built.title).size(18), picture, save_button]
            .spacing(10)
            .width(Length::FillPortion(3))
            .into()
    }
}

async fn load_catalog_task(folder: PathBuf) -> Result<Vec<CatalogEntry>, String> {
    tokio::task::spawn_blocking(move || catalog::list_images(&folder).map_err(|err| err.to_string()))
        .await
        .map_err(|err| err.to_string())?
}

async fn build_collage_task(request: CollageRequest, options: CollageOptions) -> Result<BuiltCollage, String> {
    tokio::task::spawn_blocking(move || {
        let image = collage::build_collage(&request.images, &options).map_err(|err| err.to_string())?;
        let rgba = DynamicImage::ImageRgb8(image.clone()).into_rgba8();
        let (width, height) = rgba.dimensions();
        let handle = iced::widget::image::Handle::from_rgba(width, height, rgba.into_raw());
        info!(title = %request.title(), "collage built");
        Ok(BuiltCollage {
            title: request.title(),
            image: Arc::new(image),
            handle,
        })
    })
    .await
    .map_err(|err| err.to_string())?
}

async fn save_collage_task(image: Arc<RgbImage>, path: PathBuf) -> Result<PathBuf, String> {
    tokio::task::spawn_blocking(move || {
        image.save(&path).map_err(|err| err.to_string())?;
        Ok(path)
    })
    .await
    .map_err(|err| err.to_string())?
}
