use redb_bincode::{ReadableTable as _, WriteTransaction};
use tracing::{debug, info};

use crate::{
    Database, DbResult, DbVersionTooHighSnafu, LOG_TARGET, cities, db_version, news_records,
    private_ad_records, row_seq, weather_alert_records,
};

/// Current schema version.
pub(crate) const DB_VER: u64 = 1;

impl Database {
    pub(crate) fn init_tables_tx(tx: &WriteTransaction) -> DbResult<()> {
        tx.open_table(&db_version::TABLE)?;
        tx.open_table(&row_seq::TABLE)?;

        tx.open_table(&news_records::TABLE)?;
        tx.open_table(&private_ad_records::TABLE)?;
        tx.open_table(&weather_alert_records::TABLE)?;

        tx.open_table(&cities::TABLE)?;
        Ok(())
    }

    pub(crate) fn handle_db_ver_migrations(dbtx: &WriteTransaction) -> DbResult<()> {
        let mut table_db_ver = dbtx.open_table(&db_version::TABLE)?;

        let Some(cur_db_ver) = table_db_ver.first()?.map(|g| g.1.value()) else {
            info!(target: LOG_TARGET, "Initializing new database");
            table_db_ver.insert(&(), &DB_VER)?;

            return Ok(());
        };

        if DB_VER < cur_db_ver {
            return DbVersionTooHighSnafu {
                db_ver: cur_db_ver,
                code_ver: DB_VER,
            }
            .fail();
        }

        debug!(target: LOG_TARGET, db_ver = cur_db_ver, "Db version");

        Ok(())
    }
}
