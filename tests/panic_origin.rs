// Registry hints for plain panics: the hook finds the panicking function on the stack.
use std::io::{self, Write};
use std::panic;
use std::sync::{Arc, Mutex};
use std::thread;

use take_a_hint::api::{HintCommand, HintError, HintRegistry, hook};

#[derive(Clone, Default)]
struct SharedSink(Arc<Mutex<Vec<u8>>>);

impl SharedSink {
    fn take(&self) -> String {
        let bytes = std::mem::take(&mut *self.0.lock().expect("sink"));
        String::from_utf8(bytes).expect("utf8")
    }
}

impl Write for SharedSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().expect("sink").extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

struct Spaceship;

impl Spaceship {
    #[inline(never)]
    fn land(&self) {
        panic!("Oxygen leak !!!");
    }
}

#[inline(never)]
fn go_to_mars() {
    panic!("Oxygen leak !!!");
}

#[inline(never)]
fn refuel() {
    panic::panic_any(HintError::of(io::Error::other("Fuel leak")));
}

fn run_in_thread(body: fn()) {
    let joined = thread::Builder::new()
        .name("mars".to_string())
        .spawn(body)
        .expect("spawn")
        .join();
    assert!(joined.is_err());
}

#[test]
fn plain_panics_pick_up_function_and_type_hints() {
    let sink = SharedSink::default();
    let hook_sink = sink.clone();
    let registry = HintRegistry::new()
        .function(module_path!(), "go_to_mars", "Default hint message")
        .scope(module_path!(), "Scope hint")
        .scope(concat!(module_path!(), "::Spaceship"), "Check the ship")
        .function(module_path!(), "refuel", "Close the fuel valve");
    let reporter = HintCommand::new().hint_messages(registry).into_reporter();
    hook::install_with_sink(reporter, move || Box::new(hook_sink.clone()));

    run_in_thread(go_to_mars);
    let go_to_mars_report = sink.take();
    run_in_thread(|| Spaceship.land());
    let land_report = sink.take();
    run_in_thread(refuel);
    let refuel_report = sink.take();
    let _ = panic::take_hook();

    assert_eq!(
        go_to_mars_report,
        "\n❌ error:\tApplication failed with exception : Oxygen leak !!!\n\
         \n✅ hints:\tDefault hint message\n"
    );
    assert_eq!(
        land_report,
        "\n❌ error:\tApplication failed with exception : Oxygen leak !!!\n\
         \n✅ hints:\tCheck the ship\n"
    );
    assert_eq!(
        refuel_report,
        "\n❌ error:\tApplication failed with exception : Fuel leak\n\
         \n✅ hints:\tClose the fuel valve\n"
    );
}
