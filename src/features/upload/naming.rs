use chrono::Utc;
use rand::Rng;

const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const RANDOM_LEN: usize = 7;

/// 生成对象名：`<prefix>-<毫秒时间戳>-<7 位 base36 随机串>.<ext>`
pub fn object_name(prefix: &str, extension: &str) -> String {
    object_name_with(
        prefix,
        extension,
        Utc::now().timestamp_millis(),
        &mut rand::thread_rng(),
    )
}

fn object_name_with<R: Rng + ?Sized>(
    prefix: &str,
    extension: &str,
    millis: i64,
    rng: &mut R,
) -> String {
    let suffix: String = (0..RANDOM_LEN)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect();
    format!("{prefix}-{millis}-{suffix}.{extension}")
}
