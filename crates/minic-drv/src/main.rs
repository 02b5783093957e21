use std::process::ExitCode;

fn main() -> ExitCode {
    minic_drv::run()
}
