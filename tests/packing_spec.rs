use qc_pack::config::Settings;
use qc_pack::models::*;
use qc_pack::packing::{PackingLine, Placement};
use qc_pack::store::{MemoryRecordStore, RecordKey, RecordStore};
use qc_pack::Error;
use speculate2::speculate;
use std::cell::Cell;
use std::rc::Rc;

fn part(id: &str, weight: f64, color: &str, length: f64) -> NewItem {
    NewItem {
        id: id.to_string(),
        weight,
        color: color.to_string(),
        length,
    }
}

fn good(id: &str) -> NewItem {
    part(id, 100.0, "azul", 15.0)
}

fn bad(id: &str) -> NewItem {
    part(id, 200.0, "preto", 5.0)
}

fn settings(capacity: usize) -> Settings {
    Settings {
        box_capacity: capacity,
        ..Settings::default()
    }
}

fn open_line(capacity: usize) -> PackingLine<MemoryRecordStore> {
    PackingLine::open(MemoryRecordStore::new(), &settings(capacity)).expect("Failed to open line")
}

/// Reopen a line over a copy of another line's records.
fn reopen(line: &PackingLine<MemoryRecordStore>) -> PackingLine<MemoryRecordStore> {
    PackingLine::open(line.records().backend().clone(), &settings(line.capacity()))
        .expect("Failed to reopen line")
}

fn persisted_box(line: &PackingLine<MemoryRecordStore>, id: u32) -> PackBox {
    line.records()
        .load_box(&RecordKey::Box(id))
        .expect("Failed to load box")
        .expect("Box record missing")
}

/// Record store whose writes can be switched off from outside.
#[derive(Default)]
struct FlakyStore {
    inner: MemoryRecordStore,
    fail_writes: Rc<Cell<bool>>,
}

impl RecordStore for FlakyStore {
    fn list_boxes(&self) -> qc_pack::Result<Vec<RecordKey>> {
        self.inner.list_boxes()
    }

    fn read(&self, key: &RecordKey) -> qc_pack::Result<Option<String>> {
        self.inner.read(key)
    }

    fn write(&mut self, key: &RecordKey, body: &str) -> qc_pack::Result<()> {
        if self.fail_writes.get() {
            return Err(Error::Io(std::io::Error::other("disk full")));
        }
        self.inner.write(key, body)
    }
}

speculate! {
    before {
        let mut line = open_line(10);
    }

    describe "register" {
        it "boxes an approved part" {
            let item = line.register(part("P1", 100.0, "Azul ", 15.0)).expect("register failed");

            assert!(item.approved);
            assert_eq!(item.color, "azul");
            assert_eq!(line.inventory().approved_ids(), &["P1"]);
            assert_eq!(line.inventory().open_box().item_ids().collect::<Vec<_>>(), vec!["P1"]);
            assert_eq!(persisted_box(&line, 1).items, vec![item]);
        }

        it "sends a failing part to the reject set with every reason" {
            let item = line.register(bad("R1")).expect("register failed");

            assert!(!item.approved);
            assert_eq!(
                item.failure_reasons,
                vec!["weight out of range", "invalid color", "length out of range"]
            );
            assert_eq!(line.inventory().rejected_ids(), &["R1"]);
            assert!(line.inventory().open_box().is_empty());
            assert_eq!(line.records().load_rejects(), vec![item]);
        }

        it "refuses a duplicate id before evaluation" {
            line.register(good("P1")).expect("register failed");
            let before = line.inventory().clone();

            let err = line.register(bad("P1")).unwrap_err();
            assert!(matches!(err, Error::DuplicateId(id) if id == "P1"));
            assert_eq!(line.inventory(), &before);
            assert!(line.records().load_rejects().is_empty());
        }

        it "refuses an empty id" {
            let err = line.register(good("   ")).unwrap_err();
            assert!(matches!(err, Error::InvalidInput(_)));
            assert!(line.inventory().items().is_empty());
        }
    }

    describe "store" {
        it "seals box 1 at capacity and opens box 2" {
            for i in 1..=10 {
                line.register(good(&format!("P{}", i))).expect("register failed");
            }

            let inventory = line.inventory();
            assert_eq!(inventory.closed_boxes().len(), 1);
            let sealed = &inventory.closed_boxes()[0];
            assert_eq!(sealed.id, 1);
            assert!(sealed.closed);
            assert_eq!(sealed.len(), 10);
            assert_eq!(inventory.open_box(), &PackBox::open(2));

            assert_eq!(persisted_box(&line, 1), *sealed);
            assert_eq!(persisted_box(&line, 2), PackBox::open(2));
        }

        it "never lets the open box reach capacity" {
            let mut line = open_line(3);
            for i in 1..=11 {
                let placement = line
                    .store(classified(&format!("P{}", i)))
                    .expect("store failed");
                assert_eq!(placement.sealed, i % 3 == 0);
                assert!(line.inventory().open_box().len() < 3);
                assert!(!line.inventory().open_box().closed);
            }

            let ids: Vec<u32> = line.inventory().closed_boxes().iter().map(|b| b.id).collect();
            assert_eq!(ids, vec![1, 2, 3]);
            assert_eq!(line.inventory().open_box().id, 4);
            assert_eq!(line.inventory().open_box().len(), 2);
        }

        it "reports where the item went" {
            let mut line = open_line(2);
            assert_eq!(
                line.store(classified("P1")).unwrap(),
                Placement { box_id: 1, sealed: false }
            );
            assert_eq!(
                line.store(classified("P2")).unwrap(),
                Placement { box_id: 1, sealed: true }
            );
            assert_eq!(
                line.store(classified("P3")).unwrap(),
                Placement { box_id: 2, sealed: false }
            );
        }

        it "refuses unapproved items" {
            let mut item = classified("X1");
            item.approved = false;
            item.failure_reasons = vec!["invalid color".to_string()];

            assert!(matches!(line.store(item), Err(Error::InvalidInput(_))));
            assert!(line.inventory().items().is_empty());
        }

        it "leaves state untouched when the box write fails" {
            let fail_writes = Rc::new(Cell::new(false));
            let store = FlakyStore {
                inner: MemoryRecordStore::new(),
                fail_writes: Rc::clone(&fail_writes),
            };
            let mut line = PackingLine::open(store, &settings(2)).expect("Failed to open line");
            line.store(classified("P1")).expect("store failed");
            let before = line.inventory().clone();

            fail_writes.set(true);
            assert!(matches!(line.store(classified("P2")), Err(Error::Io(_))));
            assert_eq!(line.inventory(), &before);
        }
    }

    describe "remove" {
        it "fails with NotFound for an unknown id" {
            line.register(good("P1")).expect("register failed");
            line.register(bad("R1")).expect("register failed");
            let before = line.inventory().clone();

            let err = line.remove("X").unwrap_err();
            assert!(matches!(err, Error::NotFound(id) if id == "X"));
            assert_eq!(line.inventory(), &before);
        }

        it "removes from the open box and keeps it open" {
            line.register(good("P1")).expect("register failed");
            line.register(good("P2")).expect("register failed");

            let removed = line.remove("P1").expect("remove failed");
            assert_eq!(removed.id, "P1");
            assert!(!line.inventory().contains("P1"));
            assert_eq!(line.inventory().approved_ids(), &["P2"]);

            let open = persisted_box(&line, 1);
            assert!(!open.closed);
            assert_eq!(open.item_ids().collect::<Vec<_>>(), vec!["P2"]);
        }

        it "keeps a closed box closed below capacity" {
            for i in 1..=10 {
                line.register(good(&format!("P{}", i))).expect("register failed");
            }

            line.remove("P4").expect("remove failed");

            let sealed = &line.inventory().closed_boxes()[0];
            assert!(sealed.closed);
            assert_eq!(sealed.len(), 9);
            assert!(sealed.position_of("P4").is_none());
            assert_eq!(persisted_box(&line, 1), *sealed);
            assert_eq!(line.inventory().open_box().id, 2);
        }

        it "does not refill a closed box afterwards" {
            for i in 1..=10 {
                line.register(good(&format!("P{}", i))).expect("register failed");
            }
            line.remove("P1").expect("remove failed");
            line.register(good("P11")).expect("register failed");

            assert_eq!(line.inventory().closed_boxes()[0].len(), 9);
            assert_eq!(
                line.inventory().open_box().item_ids().collect::<Vec<_>>(),
                vec!["P11"]
            );
        }

        it "removes a rejected item and rewrites the reject set" {
            line.register(bad("R1")).expect("register failed");
            line.register(bad("R2")).expect("register failed");

            line.remove("R1").expect("remove failed");

            assert_eq!(line.inventory().rejected_ids(), &["R2"]);
            let ids: Vec<String> = line.records().load_rejects().into_iter().map(|i| i.id).collect();
            assert_eq!(ids, vec!["R2"]);
        }

        it "allows the id to be registered again" {
            line.register(bad("P1")).expect("register failed");
            line.remove("P1").expect("remove failed");

            let item = line.register(good("P1")).expect("register failed");
            assert!(item.approved);
            assert!(line.inventory().rejected_ids().is_empty());
        }
    }

    describe "persistence" {
        it "reopens to the same state" {
            let mut line = open_line(3);
            for i in 1..=7 {
                line.register(good(&format!("P{}", i))).expect("register failed");
            }
            line.register(bad("R1")).expect("register failed");
            line.remove("P2").expect("remove failed");

            let reopened = reopen(&line);
            assert_eq!(reopened.inventory(), line.inventory());
        }
    }
}

fn classified(id: &str) -> Item {
    Item {
        id: id.to_string(),
        weight: 100.0,
        color: "verde".to_string(),
        length: 12.0,
        approved: true,
        failure_reasons: vec![],
    }
}
