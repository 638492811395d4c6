//! 拉链哈希表演示：插入、查询、删除后再次查询

use chained_hashtable::{ChainedError, ChainedMap};
use env_logger::{Builder, Env};
use std::io::Write;

// 初始化日志记录器
fn init_logger() {
    let env = Env::default().filter_or("RUST_LOG", "debug");

    Builder::from_env(env)
        .format(|buf, record| {
            writeln!(
                buf,
                "[{}] {}:{} - {}",
                record.level(),
                record.file().unwrap_or("unknown"),
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .init();
}

fn main() -> Result<(), ChainedError> {
    init_logger();

    let mut table = ChainedMap::new(100)?;

    // 插入键值对
    table.insert("a", 1);
    table.insert("b", 2);
    table.insert("c", 3);

    // 查询
    println!("{}", table.get("a")?);
    println!("{}", table.get("b")?);

    // 删除后再次查询
    table.delete("b")?;
    match table.get("b") {
        Ok(value) => println!("{}", value),
        Err(e) => {
            println!("{}", e);
            if let Some(hint) = e.recovery_suggestion() {
                log::info!("recovery hint: {}", hint);
            }
        }
    }

    println!("{:?}", table.stats());
    Ok(())
}
