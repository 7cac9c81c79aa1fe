pub const INSERT_ALERT: &str = r#"
INSERT INTO alerts (id, target_plate, sender_name, message, icon, created_at)
VALUES ($1, $2, $3, $4, $5, $6);
"#;

pub const SELECT_RECENT_ALERTS: &str = r#"
SELECT id, target_plate, sender_name, message, icon, created_at
FROM alerts
WHERE target_plate = $1
ORDER BY created_at DESC
LIMIT $2;
"#;

pub const DELETE_ALERTS_BEYOND_KEEP: &str = r#"
DELETE FROM alerts
WHERE target_plate = $1
  AND id NOT IN (
    SELECT id FROM alerts
    WHERE target_plate = $1
    ORDER BY created_at DESC
    LIMIT $2
  );
"#;

pub const SELECT_VEHICLE_EXISTS: &str = r#"
SELECT EXISTS(SELECT 1 FROM vehicles WHERE plate = $1);
"#;
