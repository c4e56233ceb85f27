use clap::Parser;
use screenplay_rust::{collect_character_names, load_script, parse, segment_scenes, Conf, ScriptResult};
use screenplay_rust::parser::strip_front_matter;
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// 剧本结构解析器
#[derive(Parser, Debug)]
#[command(name = "screenplay-parser")]
struct Args {
    /// 剧本文件（.txt 或 .fountain）
    file_path: PathBuf,

    /// 只列出场景标题和候选角色
    #[arg(long = "scenes")]
    list_scenes: bool,

    /// JSON 配置文件
    #[arg(long = "config")]
    config_path: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .init();

    let args = Args::parse();
    if let Err(e) = run(args).await {
        println!("处理失败: {}", e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> ScriptResult<()> {
    let conf = match &args.config_path {
        Some(path) => Conf::from_json_file(path)?,
        None => Conf::default(),
    };
    let content = load_script(&args.file_path).await?;

    if args.list_scenes {
        let text = if conf.strip_front_matter {
            strip_front_matter(&content)
        } else {
            content
        };
        let scenes = segment_scenes(&text);
        println!("场景数量: {}", scenes.len());
        for (i, scene) in scenes.iter().enumerate() {
            println!("{:>4}  {}", i + 1, scene.heading);
        }
        let names = collect_character_names(&text);
        println!("候选角色 ({}): {}", names.len(), names.join(", "));
        return Ok(());
    }

    let result = parse(&content);
    println!("解析完成！");
    println!("解析时间: {}ms", result.parse_time.unwrap_or(0));
    println!("片段数量: {}", result.segments.len());
    println!("场景数量: {}", result.scenes.len());

    let mut json_path = args.file_path.into_os_string();
    json_path.push(".json");
    let json_path = PathBuf::from(json_path);
    fs::write(&json_path, serde_json::to_string_pretty(&result)?)?;
    println!("JSON输出已保存到: {}", json_path.display());
    Ok(())
}
