// Redis adapter for reservations, sold markers and per-user counters

use std::time::Duration;

use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client, Script};

use crate::config::SaleLimits;
use crate::kv::error::ReservationError;

/// Sorted set of all live reservations (score = expiry epoch-seconds)
const GLOBAL_SET_KEY: &str = "reservations:global";

/// Applies the reservation checks and writes in one atomic server-side step,
/// so no concurrent request can interleave between a check and a write.
///
/// KEYS: 1 sold marker, 2 item lock, 3 global set, 4 user purchase counter,
/// 5 user set, 6 reservation record.
/// ARGV: 1 code, 2 "user|item" payload, 3 ttl seconds, 4 expiry score,
/// 5 inventory cap, 6 per-user total cap, 7 per-user concurrent cap.
const RESERVE_SCRIPT: &str = r#"
if redis.call('EXISTS', KEYS[1]) == 1 then
    return 'SOLD'
end
if redis.call('EXISTS', KEYS[2]) == 1 then
    return 'RESERVED'
end
if redis.call('ZCARD', KEYS[3]) >= tonumber(ARGV[5]) then
    return 'SOLD_OUT'
end
if tonumber(redis.call('GET', KEYS[4]) or '0') >= tonumber(ARGV[6]) then
    return 'TOTAL_LIMIT'
end
if redis.call('ZCARD', KEYS[5]) >= tonumber(ARGV[7]) then
    return 'CONCURRENT_LIMIT'
end
redis.call('SET', KEYS[2], ARGV[1], 'EX', ARGV[3])
redis.call('ZADD', KEYS[3], ARGV[4], ARGV[1])
redis.call('ZADD', KEYS[5], ARGV[4], ARGV[1])
redis.call('SET', KEYS[6], ARGV[2], 'EX', ARGV[3])
return 'OK'
"#;

/// Redis-backed store for the transient reservation state and the permanent
/// sold markers / purchase counters.
#[derive(Clone)]
pub struct ReservationStore {
    conn: ConnectionManager,
    reserve: Script,
    ttl: Duration,
    limits: SaleLimits,
}

impl ReservationStore {
    /// Connects to Redis and prepares the reservation script.
    pub async fn connect(
        redis_url: &str,
        ttl: Duration,
        limits: SaleLimits,
    ) -> Result<Self, ReservationError> {
        let client = Client::open(redis_url)?;
        let conn = ConnectionManager::new(client).await?;

        Ok(Self {
            conn,
            reserve: Script::new(RESERVE_SCRIPT),
            ttl,
            limits,
        })
    }

    /// Verifies connectivity; used for the boot-time reachability check.
    pub async fn ping(&self) -> Result<(), ReservationError> {
        let mut conn = self.conn.clone();
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }

    fn sold_key(item_id: &str) -> String {
        format!("item_sold:{item_id}")
    }

    fn item_lock_key(item_id: &str) -> String {
        format!("item_reservation:{item_id}")
    }

    fn reservation_key(code: &str) -> String {
        format!("reservation:{code}")
    }

    fn user_set_key(user_id: &str) -> String {
        format!("reservations:user:{user_id}")
    }

    fn purchase_count_key(user_id: &str) -> String {
        format!("user_purchases:{user_id}")
    }

    /// Atomically reserves `item_id` for `user_id` under `code`, enforcing
    /// the sold marker, the item lock, the global inventory cap and both
    /// per-user caps. On success the item lock, the reservation record and
    /// the global/user set entries are all written with the reservation TTL.
    pub async fn create_reservation(
        &self,
        user_id: &str,
        item_id: &str,
        code: &str,
    ) -> Result<(), ReservationError> {
        let mut conn = self.conn.clone();
        let expire_at = chrono::Utc::now().timestamp() + self.ttl.as_secs() as i64;

        let status: String = self
            .reserve
            .key(Self::sold_key(item_id))
            .key(Self::item_lock_key(item_id))
            .key(GLOBAL_SET_KEY)
            .key(Self::purchase_count_key(user_id))
            .key(Self::user_set_key(user_id))
            .key(Self::reservation_key(code))
            .arg(code)
            .arg(encode_reservation(user_id, item_id))
            .arg(self.ttl.as_secs())
            .arg(expire_at)
            .arg(self.limits.inventory_cap)
            .arg(self.limits.total_cap)
            .arg(self.limits.concurrent_cap)
            .invoke_async(&mut conn)
            .await?;

        match status.as_str() {
            "OK" => Ok(()),
            "SOLD" => Err(ReservationError::ItemAlreadySold),
            "RESERVED" => Err(ReservationError::ItemReserved),
            "SOLD_OUT" => Err(ReservationError::SoldOut),
            "TOTAL_LIMIT" => Err(ReservationError::TotalLimitExceeded(self.limits.total_cap)),
            "CONCURRENT_LIMIT" => Err(ReservationError::ConcurrentLimitExceeded),
            other => Err(redis::RedisError::from((
                redis::ErrorKind::TypeError,
                "unexpected reservation script reply",
                other.to_string(),
            ))
            .into()),
        }
    }

    /// Resolves a reservation code to its `(user_id, item_id)` pair. A missing
    /// or TTL-expired record is `NotFound`.
    pub async fn get_reservation(&self, code: &str) -> Result<(String, String), ReservationError> {
        let mut conn = self.conn.clone();
        let value: Option<String> = conn.get(Self::reservation_key(code)).await?;

        match value {
            Some(payload) => decode_reservation(&payload),
            None => Err(ReservationError::NotFound),
        }
    }

    /// Removes the item lock, the reservation record and the set entries.
    /// Best-effort: an error is returned only when every removal attempt
    /// failed; partial failures are logged and the TTL reaps the leftovers.
    pub async fn delete_reservation(
        &self,
        user_id: &str,
        item_id: &str,
        code: &str,
    ) -> Result<(), ReservationError> {
        let mut conn = self.conn.clone();
        let mut removed_any = false;
        let mut last_err: Option<redis::RedisError> = None;

        let deleted: Result<i64, redis::RedisError> = conn
            .del(vec![
                Self::item_lock_key(item_id),
                Self::reservation_key(code),
            ])
            .await;
        match deleted {
            Ok(_) => removed_any = true,
            Err(err) => {
                tracing::warn!(code = %code, error = %err, "failed to delete reservation keys");
                last_err = Some(err);
            }
        }

        for set_key in [GLOBAL_SET_KEY.to_string(), Self::user_set_key(user_id)] {
            let removed: Result<i64, redis::RedisError> = conn.zrem(&set_key, code).await;
            match removed {
                Ok(_) => removed_any = true,
                Err(err) => {
                    tracing::warn!(key = %set_key, code = %code, error = %err, "failed to remove reservation set entry");
                    last_err = Some(err);
                }
            }
        }

        match last_err {
            Some(err) if !removed_any => Err(err.into()),
            _ => Ok(()),
        }
    }

    /// Marks an item as permanently sold. No expiry; cleared only by an
    /// operator.
    pub async fn mark_item_sold(&self, item_id: &str) -> Result<(), ReservationError> {
        let mut conn = self.conn.clone();
        let _: () = conn.set(Self::sold_key(item_id), "sold").await?;
        Ok(())
    }

    /// Increments the user's lifetime purchase counter and returns the new
    /// count.
    pub async fn increment_user_purchases(&self, user_id: &str) -> Result<i64, ReservationError> {
        let mut conn = self.conn.clone();
        let count: i64 = conn.incr(Self::purchase_count_key(user_id), 1).await?;
        Ok(count)
    }

    /// Clears all transient reservation keys: item locks, reservation records
    /// and the user/global sorted sets. Sold markers and purchase counters
    /// are preserved.
    pub async fn reset_transient(&self) -> Result<(), ReservationError> {
        let mut keys: Vec<String> = Vec::new();
        {
            let mut scan_conn = self.conn.clone();
            for pattern in ["item_reservation:*", "reservation:*", "reservations:user:*"] {
                let mut iter = scan_conn.scan_match::<_, String>(pattern).await?;
                while let Some(key) = iter.next_item().await {
                    keys.push(key);
                }
            }
        }
        keys.push(GLOBAL_SET_KEY.to_string());

        let mut conn = self.conn.clone();
        let mut pipe = redis::pipe();
        for key in &keys {
            pipe.del(key).ignore();
        }
        let _: () = pipe.query_async(&mut conn).await?;

        tracing::info!(cleared = keys.len(), "transient reservation keys reset");
        Ok(())
    }
}

/// Value stored under `reservation:{code}`.
fn encode_reservation(user_id: &str, item_id: &str) -> String {
    format!("{user_id}|{item_id}")
}

fn decode_reservation(payload: &str) -> Result<(String, String), ReservationError> {
    match payload.split_once('|') {
        Some((user_id, item_id)) if !user_id.is_empty() && !item_id.is_empty() => {
            Ok((user_id.to_string(), item_id.to_string()))
        }
        _ => Err(ReservationError::InvalidFormat),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_layout_matches_external_tooling() {
        assert_eq!(ReservationStore::sold_key("i1"), "item_sold:i1");
        assert_eq!(
            ReservationStore::item_lock_key("i1"),
            "item_reservation:i1"
        );
        assert_eq!(
            ReservationStore::reservation_key("deadbeef"),
            "reservation:deadbeef"
        );
        assert_eq!(
            ReservationStore::user_set_key("u1"),
            "reservations:user:u1"
        );
        assert_eq!(
            ReservationStore::purchase_count_key("u1"),
            "user_purchases:u1"
        );
        assert_eq!(GLOBAL_SET_KEY, "reservations:global");
    }

    #[test]
    fn reservation_payload_round_trip() {
        let payload = encode_reservation("u1", "i1");
        assert_eq!(payload, "u1|i1");
        assert_eq!(
            decode_reservation(&payload).unwrap(),
            ("u1".to_string(), "i1".to_string())
        );
    }

    #[test]
    fn malformed_payload_is_rejected() {
        assert!(matches!(
            decode_reservation("no-separator"),
            Err(ReservationError::InvalidFormat)
        ));
        assert!(matches!(
            decode_reservation("|i1"),
            Err(ReservationError::InvalidFormat)
        ));
        assert!(matches!(
            decode_reservation("u1|"),
            Err(ReservationError::InvalidFormat)
        ));
    }
}
