use shapeswarm::{RoomTextures, Swarm};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // shapeswarm [TEXT] [MEDIA_DIR]
    let mut args = std::env::args().skip(1);
    let text = args.next().unwrap_or_else(|| "RUST".to_string());
    let media = args.next().unwrap_or_else(|| "media".to_string());

    let result = Swarm::new()
        .with_text(&text)
        .with_room_textures(RoomTextures::from_dir(&media))
        .with_title(&format!("shapeswarm - {}", text))
        .run();

    if let Err(e) = result {
        log::error!("{}", e);
        std::process::exit(1);
    }
}
