/*!
std::time - wall clock readings
*/

use crate::{Host, Module, NativeResult, Value, arg};
use std::time::{SystemTime, UNIX_EPOCH};

pub fn module() -> Module {
    Module::new("std::time")
        .function("now", 0, now)
        .function("timestamp", 0, timestamp)
        .function("elapsed", 1, elapsed)
}

fn since_epoch() -> std::time::Duration {
    // A clock set before 1970 reads as the epoch itself
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
}

/// Milliseconds since the Unix epoch
pub(crate) fn now(_: &mut Host<'_>, _: &[Value]) -> NativeResult {
    Ok(Value::Int(since_epoch().as_millis() as i64))
}

/// Seconds since the Unix epoch
pub(crate) fn timestamp(_: &mut Host<'_>, _: &[Value]) -> NativeResult {
    Ok(Value::Int(since_epoch().as_secs() as i64))
}

/// Milliseconds elapsed since a previous `now()` reading
fn elapsed(_: &mut Host<'_>, args: &[Value]) -> NativeResult {
    let start = arg(args, 0).to_int();
    Ok(Value::Int((since_epoch().as_millis() as i64).wrapping_sub(start)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::call;

    #[test]
    fn test_now_and_timestamp_agree() {
        let m = module();
        let Ok(Value::Int(ms)) = call(&m, "now", &[]) else {
            panic!("now should return an int");
        };
        let Ok(Value::Int(secs)) = call(&m, "timestamp", &[]) else {
            panic!("timestamp should return an int");
        };
        assert!((ms / 1000 - secs).abs() <= 1);
    }

    #[test]
    fn test_elapsed_is_non_negative() {
        let m = module();
        let start = call(&m, "now", &[]).unwrap();
        let Ok(Value::Int(delta)) = call(&m, "elapsed", &[start]) else {
            panic!("elapsed should return an int");
        };
        assert!(delta >= 0);
    }

    #[test]
    fn test_elapsed_wraps_on_extreme_start() {
        let m = module();
        assert!(matches!(
            call(&m, "elapsed", &[Value::Int(i64::MIN)]),
            Ok(Value::Int(_))
        ));
    }
}
