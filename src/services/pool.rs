//! Pool backlog service
//!
//! The backlog (`_pool/backlog.md`) holds records that have no month yet:
//! expected receivables, planned purchases. Items use the record grammar
//! under a `## POOL` marker and are addressed by position, like ROWS.
//! Moving an item appends it to a month's ROWS and then drops it from the
//! backlog.

use crate::error::{LedgerError, LedgerResult};
use crate::models::{Transaction, YearMonth};
use crate::parser::{format_transaction, parse_line};
use crate::storage::{Ledger, MonthDocument, Section};

use super::transaction::{ListedRecord, TransactionService};

/// Service for the pool backlog
pub struct PoolService<'a> {
    ledger: &'a Ledger,
}

impl<'a> PoolService<'a> {
    /// Create a new pool service
    pub fn new(ledger: &'a Ledger) -> Self {
        Self { ledger }
    }

    /// Backlog items in file order, unparsed ones included
    pub fn list(&self) -> LedgerResult<Vec<ListedRecord>> {
        let pool = self.ledger.load_pool()?;
        let currencies = self.ledger.currencies();

        Ok(pool
            .records(Section::Pool)?
            .into_iter()
            .enumerate()
            .filter_map(|(position, (index, line))| {
                parse_line(line, index + 1, currencies).map(|transaction| ListedRecord {
                    number: position + 1,
                    transaction,
                })
            })
            .collect())
    }

    /// Append an item, returning its position
    pub fn add(&self, txn: &Transaction) -> LedgerResult<usize> {
        txn.validate()
            .map_err(|e| LedgerError::Validation(e.to_string()))?;

        let mut pool = self.ledger.load_pool()?;
        pool.insert_record(Section::Pool, format_transaction(txn))?;
        self.ledger.save_pool(&pool)?;

        Ok(pool.records(Section::Pool)?.len())
    }

    /// Parse direct input (`DAY | DESCRIPTION | AMOUNT CURRENCY | TAGS`) and
    /// append it
    pub fn add_input(&self, input: &str, note: Option<&str>) -> LedgerResult<(usize, Transaction)> {
        let mut txn = TransactionService::new(self.ledger).parse_input(input)?;
        if let Some(note) = note.filter(|n| !n.trim().is_empty()) {
            txn.set_note(note.trim());
        }
        let number = self.add(&txn)?;
        Ok((number, txn))
    }

    /// Move the n-th item into a month's ROWS
    ///
    /// The day is clamped into the target month. The month file is written
    /// before the backlog, so a failure never loses the item. Returns the
    /// item's position in ROWS.
    pub fn move_to_month(&self, number: usize, month: YearMonth) -> LedgerResult<(usize, Transaction)> {
        let mut pool = self.ledger.load_pool()?;
        let index = locate(&pool, number)?;

        let mut txn = parse_line(&pool.lines()[index], index + 1, self.ledger.currencies())
            .ok_or_else(|| LedgerError::record_not_found(number))?;
        if txn.is_unparsed {
            return Err(LedgerError::Validation(format!(
                "Pool item {} does not parse ('{}'); fix it in the file first",
                number, txn.raw
            )));
        }
        txn.checkbox = None;
        txn.day = month.clamp_day(txn.day);

        let position = TransactionService::new(self.ledger).add(month, &txn)?;

        pool.remove_line(index)?;
        self.ledger.save_pool(&pool)?;
        Ok((position, txn))
    }

    /// Remove the n-th item, returning the removed line
    pub fn remove(&self, number: usize) -> LedgerResult<String> {
        let mut pool = self.ledger.load_pool()?;
        let index = locate(&pool, number)?;

        let removed = pool.remove_line(index)?;
        self.ledger.save_pool(&pool)?;
        Ok(removed.trim().to_string())
    }
}

fn locate(pool: &MonthDocument, number: usize) -> LedgerResult<usize> {
    pool.locate_nth_record(Section::Pool, number)?
        .ok_or_else(|| LedgerError::NotFound {
            entity_type: "Pool item",
            identifier: format!("#{}", number),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::settings::Settings;
    use crate::config::LedgerPaths;
    use crate::models::Money;
    use crate::storage::init::initialize_ledger;
    use tempfile::TempDir;

    fn test_ledger() -> (TempDir, Ledger) {
        let temp_dir = TempDir::new().unwrap();
        let paths = LedgerPaths::with_dirs(temp_dir.path(), temp_dir.path().join("data"));
        initialize_ledger(&paths, &Settings::default(), 2026, 0).unwrap();
        (temp_dir, Ledger::open(paths).unwrap())
    }

    fn read_backlog(temp_dir: &TempDir) -> String {
        std::fs::read_to_string(temp_dir.path().join("_pool").join("backlog.md")).unwrap()
    }

    #[test]
    fn test_add_and_list() {
        let (temp_dir, ledger) = test_ledger();
        let service = PoolService::new(&ledger);

        let (n1, _) = service.add_input("15 | Laptop | -40000 TL | #tech", None).unwrap();
        let (n2, txn) = service
            .add_input("1 | Invoice 12 | 2500 USD |", Some("client pays late"))
            .unwrap();
        assert_eq!((n1, n2), (1, 2));
        assert_eq!(txn.note(), Some("client pays late"));

        let backlog = read_backlog(&temp_dir);
        assert!(backlog.contains(
            "## POOL\n- 15 | Laptop | -40000.00 TRY | #tech\n- 01 | Invoice 12 | 2500.00 USD | | [NOTE:client pays late]\n"
        ));

        let items = service.list().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].transaction.description, "Laptop");
        assert_eq!(items[1].number, 2);
        assert_eq!(items[1].transaction.amount, Money::from_units(2500));
    }

    #[test]
    fn test_move_to_month() {
        let (temp_dir, ledger) = test_ledger();
        let service = PoolService::new(&ledger);
        service.add_input("31 | Laptop | -40000 TL | #tech", None).unwrap();
        service.add_input("2 | Desk | -3000 TL |", None).unwrap();

        let february = YearMonth::new(2026, 2).unwrap();
        let (position, txn) = service.move_to_month(1, february).unwrap();
        assert_eq!(position, 1);
        assert_eq!(txn.day, 28);

        let month = std::fs::read_to_string(temp_dir.path().join("2026").join("02.md")).unwrap();
        assert!(month.contains("## ROWS\n- 28 | Laptop | -40000.00 TRY | #tech\n"));

        let items = service.list().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].transaction.description, "Desk");
    }

    #[test]
    fn test_move_unparsed_item_is_refused() {
        let (temp_dir, ledger) = test_ledger();
        std::fs::write(
            temp_dir.path().join("_pool").join("backlog.md"),
            "# Backlog\n\n## POOL\n- Laptop | 40000 | someday\n",
        )
        .unwrap();
        let service = PoolService::new(&ledger);

        assert!(service.list().unwrap()[0].transaction.is_unparsed);

        let err = service
            .move_to_month(1, YearMonth::new(2026, 3).unwrap())
            .unwrap_err();
        assert!(err.is_validation());
        assert_eq!(service.list().unwrap().len(), 1);
    }

    #[test]
    fn test_failed_move_keeps_item() {
        let (temp_dir, ledger) = test_ledger();
        let service = PoolService::new(&ledger);
        service.add_input("5 | Desk | -3000 TL |", None).unwrap();
        std::fs::write(
            temp_dir.path().join("2026").join("03.md"),
            "# 2026 March\n\n## RULES\n",
        )
        .unwrap();

        let err = service
            .move_to_month(1, YearMonth::new(2026, 3).unwrap())
            .unwrap_err();
        assert!(err.is_structure());
        assert_eq!(service.list().unwrap().len(), 1);
    }

    #[test]
    fn test_remove() {
        let (_temp_dir, ledger) = test_ledger();
        let service = PoolService::new(&ledger);
        service.add_input("5 | Desk | -3000 TL |", None).unwrap();

        assert!(service.remove(2).unwrap_err().is_not_found());
        assert!(service.remove(0).unwrap_err().is_not_found());

        let removed = service.remove(1).unwrap();
        assert_eq!(removed, "- 05 | Desk | -3000.00 TRY |");
        assert!(service.list().unwrap().is_empty());
    }
}
