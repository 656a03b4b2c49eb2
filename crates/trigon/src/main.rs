use trigon_engine::device::GpuInit;
use trigon_engine::logging::{init_logging, LoggingConfig};
use trigon_engine::paint::Color;
use trigon_engine::window::{Runtime, RuntimeConfig};
use winit::dpi::PhysicalSize;

fn main() {
    init_logging(LoggingConfig::default());

    let config = RuntimeConfig {
        title: "learnOpenGL".to_string(),
        size: PhysicalSize::new(800, 600),
        resizable: true,
        clear_color: Color::BLACK,
    };

    // Vsync on: one frame per display refresh.
    let gpu_init = GpuInit {
        present_mode: wgpu::PresentMode::Fifo,
        ..GpuInit::default()
    };

    match Runtime::run(config, gpu_init) {
        Ok(frames) => log::debug!("rendered {frames} frame(s)"),
        Err(e) => {
            log::error!("{e:#}");
            std::process::exit(-1);
        }
    }
}
