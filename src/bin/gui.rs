fn main() -> iced::Result {
    sat_collage::init_tracing();
    println!("Satellite Collage - Starting GUI...");
    sat_collage::gui_app::run_iced_app()
}
