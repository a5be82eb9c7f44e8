use weightscope::WeightScopeApp;

fn main() {
    env_logger::init();
    let options = eframe::NativeOptions::default();
    let _ = eframe::run_native(
        "WeightScope",
        options,
        Box::new(|_cc| Ok(Box::new(WeightScopeApp::default()))),
    );
}
